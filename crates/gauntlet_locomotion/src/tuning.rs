//! Ability tunables

use gauntlet_core::config::{at_least, clamped, finite, Validate};
use gauntlet_core::error::Result;
use serde::{Deserialize, Serialize};

/// Tunables for dash, slide, death and respawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionTuning {
    /// Dash launch speed (units/s)
    pub dash_speed: f32,
    /// Seconds after the dash animation ends before dashing again
    pub dash_cooldown: f32,
    /// Dash clip; dashing is unavailable without one
    pub dash_clip: Option<String>,

    /// Slide launch speed, also the max speed while sliding
    pub slide_speed: f32,
    /// Seconds after the slide animation ends before sliding again
    pub slide_cooldown: f32,
    /// Capsule half-height while sliding
    pub slide_capsule_half_height: f32,
    /// Slide clip; sliding is unavailable without one
    pub slide_clip: Option<String>,

    /// Speed of the capsule and mesh restoration after a slide
    pub capsule_interp_speed: f32,
    /// Distance from the target at which restoration snaps
    pub capsule_snap_tolerance: f32,
    /// Seconds of reduced friction after a slide
    pub slide_recovery_time: f32,
    /// Friction multiplier during slide recovery
    pub recovery_friction_scale: f32,
    /// Braking multiplier during slide recovery
    pub recovery_braking_scale: f32,

    /// Death clip carrying the respawn marker
    pub death_clip: Option<String>,
    /// Respawn delay used when no death clip plays
    pub respawn_delay: f32,
    /// Falling below this height kills
    pub kill_z: Option<f32>,
    /// Being airborne longer than this kills, unless thrown by a jump pad
    pub fall_death_time: Option<f32>,
}

impl Default for LocomotionTuning {
    fn default() -> Self {
        Self {
            dash_speed: 1500.0,
            dash_cooldown: 1.0,
            dash_clip: Some("AM_Dash".to_string()),
            slide_speed: 800.0,
            slide_cooldown: 1.5,
            slide_capsule_half_height: 48.0,
            slide_clip: Some("AM_Slide".to_string()),
            capsule_interp_speed: 10.0,
            capsule_snap_tolerance: 0.5,
            slide_recovery_time: 0.3,
            recovery_friction_scale: 0.5,
            recovery_braking_scale: 0.5,
            death_clip: Some("AM_Death".to_string()),
            respawn_delay: 2.0,
            kill_z: None,
            fall_death_time: None,
        }
    }
}

impl LocomotionTuning {
    /// Tuning without any clips: no dash, no slide, timed respawn
    pub fn without_clips() -> Self {
        Self {
            dash_clip: None,
            slide_clip: None,
            death_clip: None,
            ..Default::default()
        }
    }

    /// Set dash parameters
    pub fn with_dash(mut self, speed: f32, cooldown: f32) -> Self {
        self.dash_speed = speed;
        self.dash_cooldown = cooldown;
        self
    }

    /// Set slide parameters
    pub fn with_slide(mut self, speed: f32, cooldown: f32) -> Self {
        self.slide_speed = speed;
        self.slide_cooldown = cooldown;
        self
    }

    /// Set the kill height
    pub fn with_kill_z(mut self, kill_z: f32) -> Self {
        self.kill_z = Some(kill_z);
        self
    }

    /// Set the airborne death time
    pub fn with_fall_death_time(mut self, seconds: f32) -> Self {
        self.fall_death_time = Some(seconds);
        self
    }

    /// Set the death clip
    pub fn with_death_clip(mut self, clip: Option<String>) -> Self {
        self.death_clip = clip;
        self
    }
}

impl Validate for LocomotionTuning {
    fn validated(mut self) -> Result<Self> {
        self.dash_speed = at_least("dash_speed", self.dash_speed, 0.0)?;
        self.dash_cooldown = at_least("dash_cooldown", self.dash_cooldown, 0.0)?;
        self.slide_speed = at_least("slide_speed", self.slide_speed, 0.0)?;
        self.slide_cooldown = at_least("slide_cooldown", self.slide_cooldown, 0.0)?;
        self.slide_capsule_half_height =
            at_least("slide_capsule_half_height", self.slide_capsule_half_height, 1.0)?;
        self.capsule_interp_speed = at_least("capsule_interp_speed", self.capsule_interp_speed, 0.0)?;
        self.capsule_snap_tolerance =
            at_least("capsule_snap_tolerance", self.capsule_snap_tolerance, 0.0)?;
        self.slide_recovery_time = at_least("slide_recovery_time", self.slide_recovery_time, 0.0)?;
        self.recovery_friction_scale =
            clamped("recovery_friction_scale", self.recovery_friction_scale, 0.0, 1.0)?;
        self.recovery_braking_scale =
            clamped("recovery_braking_scale", self.recovery_braking_scale, 0.0, 1.0)?;
        self.respawn_delay = at_least("respawn_delay", self.respawn_delay, 0.0)?;
        if let Some(kill_z) = self.kill_z {
            self.kill_z = Some(finite("kill_z", kill_z)?);
        }
        if let Some(seconds) = self.fall_death_time {
            self.fall_death_time = Some(at_least("fall_death_time", seconds, 0.0)?);
        }

        for (name, clip) in [
            ("dash_clip", &self.dash_clip),
            ("slide_clip", &self.slide_clip),
            ("death_clip", &self.death_clip),
        ] {
            if clip.is_none() {
                log::warn!("No {} assigned; that feature is disabled", name);
            }
        }
        Ok(self)
    }
}
