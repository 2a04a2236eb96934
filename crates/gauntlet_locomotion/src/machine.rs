//! Locomotion state machine
//!
//! Transitions:
//!
//! ```text
//! Moving --request_dash--> Dashing --clip ended--> Moving (+ DashCooldown)
//! Moving --request_slide-> Sliding --clip ended--> Moving (+ SlideRecovery, SlideCooldown)
//! any    --die-----------> Dead    --"respawn"---> Moving
//! ```

use crate::state::{BodyDefaults, LocomotionPhase, LocomotionState};
use crate::tuning::LocomotionTuning;
use gauntlet_core::animation::{AnimationController, AnimationEvent, PlaybackId, RESPAWN_NOTIFY};
use gauntlet_core::body::{CharacterBody, MovementParams};
use gauntlet_core::id::EntityId;
use gauntlet_core::math::{interp_to, vinterp_to};
use gauntlet_timer::TimerService;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Timers the machine schedules for itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocomotionTimer {
    /// Dash becomes available again
    DashCooldown,
    /// Slide becomes available again
    SlideCooldown,
    /// Full friction and braking return after a slide
    SlideRecovery,
    /// Respawn without a death clip
    Respawn,
}

/// The body and animation system one call operates on
pub struct LocomotionContext<'a> {
    pub body: &'a mut dyn CharacterBody,
    pub animator: &'a mut dyn AnimationController,
}

impl<'a> LocomotionContext<'a> {
    /// Bundle a body with its animator
    pub fn new(body: &'a mut dyn CharacterBody, animator: &'a mut dyn AnimationController) -> Self {
        Self { body, animator }
    }
}

/// Dash, slide, death and respawn for one character.
///
/// Cooldowns run on a timer service owned by the machine, so dropping the
/// machine drops them too and death can cancel them all at once.
#[derive(Debug)]
pub struct LocomotionMachine {
    owner: EntityId,
    tuning: LocomotionTuning,
    state: LocomotionState,
    spawn_defaults: BodyDefaults,
    timers: TimerService<LocomotionTimer>,
    dash_playback: Option<PlaybackId>,
    slide_playback: Option<PlaybackId>,
    death_playback: Option<PlaybackId>,
    deaths: u32,
}

impl LocomotionMachine {
    /// Create a machine for `owner`
    pub fn new(owner: EntityId, tuning: LocomotionTuning) -> Self {
        Self {
            owner,
            tuning,
            state: LocomotionState::default(),
            spawn_defaults: BodyDefaults::default(),
            timers: TimerService::new(),
            dash_playback: None,
            slide_playback: None,
            death_playback: None,
            deaths: 0,
        }
    }

    /// Capture the spawn pose and the movement values respawn restores
    pub fn begin_play(&mut self, body: &dyn CharacterBody) {
        self.state.start_location = body.position();
        self.state.start_rotation = body.rotation();
        self.spawn_defaults = BodyDefaults::capture(body);
        self.state.defaults = self.spawn_defaults;
        self.state.target_capsule_half_height = self.spawn_defaults.capsule_half_height;
        self.state.target_mesh_offset = self.spawn_defaults.mesh_offset;
        log::debug!("{} spawned at {}", self.owner, self.state.start_location);
    }

    /// Entity this machine drives
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// Tunables
    pub fn tuning(&self) -> &LocomotionTuning {
        &self.tuning
    }

    /// Current flags
    pub fn state(&self) -> &LocomotionState {
        &self.state
    }

    /// Current phase
    pub fn phase(&self) -> LocomotionPhase {
        self.state.phase()
    }

    /// Whether the character is dead
    pub fn is_dead(&self) -> bool {
        self.state.is_dead
    }

    /// How many times the character died
    pub fn deaths(&self) -> u32 {
        self.deaths
    }

    /// Pending ability timers
    pub fn timers(&self) -> &TimerService<LocomotionTimer> {
        &self.timers
    }

    /// Start a dash. Ignored while airborne, dead, mid-maneuver or cooling
    /// down.
    pub fn request_dash(&mut self, cx: &mut LocomotionContext<'_>) -> bool {
        if !self.state.dash_allowed() {
            log::debug!("{} dash ignored in {:?}", self.owner, self.phase());
            return false;
        }
        if !cx.body.is_on_ground() {
            return false;
        }

        let Some(clip) = self.tuning.dash_clip.as_deref() else {
            log::warn!("{} has no dash clip assigned", self.owner);
            return false;
        };
        let Some(playback) = cx.animator.play(clip) else {
            log::warn!("{} dash clip '{}' is unknown", self.owner, clip);
            return false;
        };

        self.state.is_dashing = true;
        self.state.can_dash = false;
        self.dash_playback = Some(playback);

        let direction = cx.body.forward();
        cx.body.launch(direction * self.tuning.dash_speed, true, true);
        log::debug!("{} dash started", self.owner);
        true
    }

    /// Start a slide. Same guards as [`request_dash`](Self::request_dash).
    pub fn request_slide(&mut self, cx: &mut LocomotionContext<'_>) -> bool {
        if !self.state.slide_allowed() {
            log::debug!("{} slide ignored in {:?}", self.owner, self.phase());
            return false;
        }
        if !cx.body.is_on_ground() {
            return false;
        }

        let Some(clip) = self.tuning.slide_clip.as_deref() else {
            log::warn!("{} has no slide clip assigned", self.owner);
            return false;
        };
        let Some(playback) = cx.animator.play(clip) else {
            log::warn!("{} slide clip '{}' is unknown", self.owner, clip);
            return false;
        };

        self.state.is_sliding = true;
        self.state.can_slide = false;
        self.slide_playback = Some(playback);

        // A body still easing back from the last slide holds scaled values
        let recovering = self.state.restoring_capsule
            || self.timers.is_scheduled(self.owner, LocomotionTimer::SlideRecovery);
        if !recovering {
            self.state.defaults = BodyDefaults::capture(&*cx.body);
        }
        self.state.restoring_capsule = false;
        self.timers.cancel_tag(self.owner, LocomotionTimer::SlideRecovery);

        let defaults = self.state.defaults;
        let height_diff = defaults.capsule_half_height - self.tuning.slide_capsule_half_height;
        cx.body.set_capsule_half_height(self.tuning.slide_capsule_half_height);
        cx.body.set_mesh_offset(defaults.mesh_offset + Vec3::new(0.0, 0.0, height_diff));

        // Max speed must rise or the launch gets clamped
        cx.body.set_movement(MovementParams {
            max_speed: self.tuning.slide_speed,
            ground_friction: 0.0,
            braking_deceleration: 0.0,
        });

        let direction = cx.body.forward();
        cx.body.launch(direction * self.tuning.slide_speed, true, true);
        log::debug!("{} slide started", self.owner);
        true
    }

    /// Route a playback event to whichever maneuver owns it
    pub fn on_animation_event(&mut self, event: &AnimationEvent, cx: &mut LocomotionContext<'_>) {
        match event {
            AnimationEvent::Notify { name, .. } if name == RESPAWN_NOTIFY => {
                self.respawn(cx);
            }
            AnimationEvent::Notify { .. } => {}
            AnimationEvent::Ended { playback, interrupted } => {
                let playback = Some(*playback);
                if playback == self.dash_playback {
                    self.end_dash(*interrupted);
                } else if playback == self.slide_playback {
                    self.end_slide(*interrupted, cx);
                } else if playback == self.death_playback {
                    self.death_playback = None;
                    if self.state.is_dead {
                        log::debug!("{} death clip ended without a respawn marker", self.owner);
                        self.respawn(cx);
                    }
                }
            }
        }
    }

    fn end_dash(&mut self, interrupted: bool) {
        self.dash_playback = None;
        self.state.is_dashing = false;
        self.start_cooldown(LocomotionTimer::DashCooldown, self.tuning.dash_cooldown);
        log::debug!("{} dash ended (interrupted: {})", self.owner, interrupted);
    }

    fn end_slide(&mut self, interrupted: bool, cx: &mut LocomotionContext<'_>) {
        self.slide_playback = None;
        self.state.is_sliding = false;

        let defaults = self.state.defaults;
        cx.body.set_movement(MovementParams {
            max_speed: defaults.movement.max_speed,
            ground_friction: defaults.movement.ground_friction * self.tuning.recovery_friction_scale,
            braking_deceleration: defaults.movement.braking_deceleration
                * self.tuning.recovery_braking_scale,
        });

        self.state.target_capsule_half_height = defaults.capsule_half_height;
        self.state.target_mesh_offset = defaults.mesh_offset;
        self.state.restoring_capsule = true;

        self.timers
            .schedule_once(self.owner, self.tuning.slide_recovery_time, LocomotionTimer::SlideRecovery);
        self.start_cooldown(LocomotionTimer::SlideCooldown, self.tuning.slide_cooldown);
        log::debug!("{} slide ended (interrupted: {})", self.owner, interrupted);
    }

    fn start_cooldown(&mut self, timer: LocomotionTimer, seconds: f32) {
        if seconds > 0.0 {
            self.timers.schedule_once(self.owner, seconds, timer);
        } else {
            self.ready(timer);
        }
    }

    fn ready(&mut self, timer: LocomotionTimer) {
        match timer {
            LocomotionTimer::DashCooldown => self.state.can_dash = true,
            LocomotionTimer::SlideCooldown => self.state.can_slide = true,
            LocomotionTimer::SlideRecovery | LocomotionTimer::Respawn => {}
        }
    }

    fn on_timer(&mut self, timer: LocomotionTimer, cx: &mut LocomotionContext<'_>) {
        match timer {
            LocomotionTimer::DashCooldown | LocomotionTimer::SlideCooldown => self.ready(timer),
            LocomotionTimer::SlideRecovery => {
                let defaults = self.state.defaults.movement;
                let mut movement = cx.body.movement();
                movement.ground_friction = defaults.ground_friction;
                movement.braking_deceleration = defaults.braking_deceleration;
                cx.body.set_movement(movement);
            }
            LocomotionTimer::Respawn => {
                self.respawn(cx);
            }
        }
    }

    /// Kill the character. Returns false if it was already dead.
    pub fn die(&mut self, cx: &mut LocomotionContext<'_>) -> bool {
        if self.state.is_dead {
            log::debug!("{} is already dead", self.owner);
            return false;
        }

        self.state.is_dead = true;
        self.state.is_dashing = false;
        self.state.is_sliding = false;
        self.state.restoring_capsule = false;
        self.dash_playback = None;
        self.slide_playback = None;
        self.timers.clear();

        cx.body.stop_movement();
        cx.body.set_movement_enabled(false);
        cx.animator.stop_all();
        cx.body.set_input_enabled(false);

        self.deaths += 1;
        log::info!("{} died at {} (deaths: {})", self.owner, cx.body.position(), self.deaths);

        self.death_playback = match self.tuning.death_clip.as_deref() {
            Some(clip) => {
                let playback = cx.animator.play(clip);
                if playback.is_none() {
                    log::warn!("{} death clip '{}' is unknown", self.owner, clip);
                }
                playback
            }
            None => None,
        };
        if self.death_playback.is_none() {
            self.timers
                .schedule_once(self.owner, self.tuning.respawn_delay, LocomotionTimer::Respawn);
        }
        true
    }

    /// Bring the character back at its spawn pose. Returns false unless it
    /// was dead.
    pub fn respawn(&mut self, cx: &mut LocomotionContext<'_>) -> bool {
        if !self.state.is_dead {
            return false;
        }

        self.timers.clear();
        self.death_playback = None;

        cx.body.set_position(self.state.start_location);
        cx.body.set_rotation(self.state.start_rotation);
        cx.body.stop_movement();
        self.spawn_defaults.apply(&mut *cx.body);
        cx.body.set_movement_enabled(true);
        cx.body.set_input_enabled(true);

        self.state.defaults = self.spawn_defaults;
        self.state.target_capsule_half_height = self.spawn_defaults.capsule_half_height;
        self.state.target_mesh_offset = self.spawn_defaults.mesh_offset;
        self.state.is_dead = false;
        self.state.reset_abilities();

        log::info!("{} respawned at {}", self.owner, self.state.start_location);
        true
    }

    /// Exempt the current flight from the airborne death timer
    pub fn mark_jump_pad_launched(&mut self) {
        if !self.state.is_dead {
            self.state.jump_pad_launched = true;
        }
    }

    /// Advance cooldowns, capsule restoration and the fall checks
    pub fn tick(&mut self, dt: f32, cx: &mut LocomotionContext<'_>) {
        for fired in self.timers.advance(dt) {
            self.on_timer(fired.tag, cx);
        }

        if self.state.is_dead {
            return;
        }

        if self.state.restoring_capsule {
            self.restore_capsule(dt, cx);
        }

        self.check_fall(dt, cx);
    }

    fn restore_capsule(&mut self, dt: f32, cx: &mut LocomotionContext<'_>) {
        let target_height = self.state.target_capsule_half_height;
        let target_mesh = self.state.target_mesh_offset;
        let speed = self.tuning.capsule_interp_speed;

        let height = interp_to(cx.body.capsule_half_height(), target_height, dt, speed);
        let mesh = vinterp_to(cx.body.mesh_offset(), target_mesh, dt, speed);

        if (height - target_height).abs() <= self.tuning.capsule_snap_tolerance {
            cx.body.set_capsule_half_height(target_height);
            cx.body.set_mesh_offset(target_mesh);
            self.state.restoring_capsule = false;
        } else {
            cx.body.set_capsule_half_height(height);
            cx.body.set_mesh_offset(mesh);
        }
    }

    fn check_fall(&mut self, dt: f32, cx: &mut LocomotionContext<'_>) {
        if cx.body.is_on_ground() {
            self.state.air_time = 0.0;
            self.state.jump_pad_launched = false;
        } else {
            self.state.air_time += dt;
        }

        if let Some(kill_z) = self.tuning.kill_z {
            if cx.body.position().z < kill_z {
                log::info!("{} fell below {}", self.owner, kill_z);
                self.die(cx);
                return;
            }
        }

        if let Some(limit) = self.tuning.fall_death_time {
            if !self.state.jump_pad_launched && self.state.air_time > limit {
                log::info!("{} fell for {:.2}s", self.owner, self.state.air_time);
                self.die(cx);
            }
        }
    }
}
