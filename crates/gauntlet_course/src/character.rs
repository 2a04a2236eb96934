//! Course characters
//!
//! A [`Character`] bundles a kinematic body, its locomotion machine and its
//! clip player. Obstacles see it through the [`Pawn`] contract.

use crate::body::{BodySettings, KinematicBody};
use crate::clip::{ClipLibrary, ClipPlayer};
use crate::floor::Floor;
use gauntlet_core::body::{Body, CameraBoom, CharacterBody, MovementParams, Pawn};
use gauntlet_core::id::EntityId;
use gauntlet_core::math::yaw_degrees;
use gauntlet_core::scene::Transform;
use gauntlet_locomotion::{LocomotionContext, LocomotionMachine, LocomotionPhase, LocomotionTuning};
use gauntlet_obstacles::Surface;
use glam::{Quat, Vec3};

/// A runner on the course
#[derive(Debug)]
pub struct Character {
    body: KinematicBody,
    locomotion: LocomotionMachine,
    clips: ClipPlayer,
    boom: Option<CameraBoom>,
    player: bool,
}

impl Character {
    /// Create a character at `spawn`. Player characters carry a follow
    /// camera.
    pub fn new(
        id: EntityId,
        spawn: &Transform,
        settings: BodySettings,
        tuning: LocomotionTuning,
        clips: ClipLibrary,
        player: bool,
    ) -> Self {
        let boom = player.then(|| CameraBoom {
            yaw: yaw_degrees(spawn.rotation),
            ..Default::default()
        });
        Self {
            body: KinematicBody::new(id, settings, spawn.translation, spawn.rotation),
            locomotion: LocomotionMachine::new(id, tuning),
            clips: ClipPlayer::new(clips),
            boom,
            player,
        }
    }

    /// Put the character on the ground and capture its spawn pose
    pub fn begin_play(&mut self, floor: &Floor, surfaces: &[Surface]) {
        if !self.body.snap_to_ground(floor, surfaces) {
            log::warn!("{} spawned with no ground below {}", self.body.id(), self.body.position());
        }
        self.locomotion.begin_play(&self.body);
    }

    pub fn body(&self) -> &KinematicBody {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut KinematicBody {
        &mut self.body
    }

    pub fn locomotion(&self) -> &LocomotionMachine {
        &self.locomotion
    }

    pub fn clips(&self) -> &ClipPlayer {
        &self.clips
    }

    /// Follow camera, if any
    pub fn camera_boom(&self) -> Option<&CameraBoom> {
        self.boom.as_ref()
    }

    /// Current maneuver
    pub fn phase(&self) -> LocomotionPhase {
        self.locomotion.phase()
    }

    /// Desired move direction
    pub fn set_move_input(&mut self, input: Vec3) {
        self.body.set_move_input(input);
    }

    /// Start a dash
    pub fn request_dash(&mut self) -> bool {
        let mut cx = LocomotionContext::new(&mut self.body, &mut self.clips);
        self.locomotion.request_dash(&mut cx)
    }

    /// Start a slide
    pub fn request_slide(&mut self) -> bool {
        let mut cx = LocomotionContext::new(&mut self.body, &mut self.clips);
        self.locomotion.request_slide(&mut cx)
    }

    /// Jump if standing and alive
    pub fn jump(&mut self) -> bool {
        !self.locomotion.is_dead() && self.body.jump()
    }

    /// Move the body, then run the abilities and deliver clip events
    pub fn update(&mut self, dt: f32, floor: &Floor, surfaces: &[Surface]) {
        self.body.integrate(dt, floor, surfaces);

        {
            let mut cx = LocomotionContext::new(&mut self.body, &mut self.clips);
            self.locomotion.tick(dt, &mut cx);
        }

        for event in self.clips.advance(dt) {
            let mut cx = LocomotionContext::new(&mut self.body, &mut self.clips);
            self.locomotion.on_animation_event(&event, &mut cx);
        }

        if let Some(boom) = self.boom.as_mut() {
            if boom.use_pawn_control_rotation {
                boom.yaw = yaw_degrees(self.body.rotation());
            }
        }
    }
}

impl Body for Character {
    fn id(&self) -> EntityId {
        self.body.id()
    }

    fn position(&self) -> Vec3 {
        self.body.position()
    }

    fn set_position(&mut self, position: Vec3) {
        self.body.set_position(position);
    }

    fn rotation(&self) -> Quat {
        self.body.rotation()
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.body.set_rotation(rotation);
    }

    fn velocity(&self) -> Vec3 {
        self.body.velocity()
    }

    fn launch(&mut self, velocity: Vec3, override_xy: bool, override_z: bool) {
        self.body.launch(velocity, override_xy, override_z);
    }

    fn is_on_ground(&self) -> bool {
        self.body.is_on_ground()
    }

    fn set_collision_enabled(&mut self, enabled: bool) {
        self.body.set_collision_enabled(enabled);
    }

    fn is_collision_enabled(&self) -> bool {
        self.body.is_collision_enabled()
    }

    fn add_world_offset(&mut self, offset: Vec3) {
        self.body.add_world_offset(offset);
    }
}

impl Pawn for Character {
    fn movement(&self) -> MovementParams {
        CharacterBody::movement(&self.body)
    }

    fn set_movement(&mut self, params: MovementParams) {
        CharacterBody::set_movement(&mut self.body, params);
    }

    fn is_player_controlled(&self) -> bool {
        self.player
    }

    fn is_dead(&self) -> bool {
        self.locomotion.is_dead()
    }

    fn kill(&mut self) -> bool {
        let mut cx = LocomotionContext::new(&mut self.body, &mut self.clips);
        self.locomotion.die(&mut cx)
    }

    fn mark_jump_pad_launched(&mut self) {
        self.locomotion.mark_jump_pad_launched();
    }

    fn freeze(&mut self) {
        self.body.stop_movement();
        self.body.set_movement_enabled(false);
        self.body.set_input_enabled(false);
        log::debug!("{} frozen at {}", self.body.id(), self.body.position());
    }

    fn camera_boom_mut(&mut self) -> Option<&mut CameraBoom> {
        self.boom.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::standard_clips;
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 64.0;

    fn runner(tuning: LocomotionTuning) -> (Character, Floor) {
        let floor = Floor::flat(0.0);
        let spawn = Transform::from_translation(Vec3::new(200.0, 0.0, 100.0));
        let mut character = Character::new(
            EntityId::new(1, 0),
            &spawn,
            BodySettings::default(),
            tuning,
            standard_clips(),
            true,
        );
        character.begin_play(&floor, &[]);
        (character, floor)
    }

    fn run(character: &mut Character, floor: &Floor, seconds: f32) {
        let frames = (seconds / DT).round() as usize;
        for _ in 0..frames {
            character.update(DT, floor, &[]);
        }
    }

    #[test]
    fn test_dash_cycle() {
        let (mut character, floor) = runner(LocomotionTuning::default());
        assert!(character.request_dash());
        assert_eq!(character.phase(), LocomotionPhase::Dashing);
        assert!(!character.request_slide());

        // Clip is half a second long, cooldown one second after that
        run(&mut character, &floor, 0.5);
        assert_eq!(character.phase(), LocomotionPhase::Moving);
        assert!(!character.request_dash());

        run(&mut character, &floor, 1.0 + DT);
        assert!(character.request_dash());
    }

    #[test]
    fn test_slide_crouches_then_stands_back_up() {
        let (mut character, floor) = runner(LocomotionTuning::default());
        assert!(character.request_slide());
        assert_relative_eq!(character.body().capsule_half_height(), 48.0);
        assert_relative_eq!(character.body().feet(), 0.0);
        assert_relative_eq!(character.body().velocity().x, 800.0);

        run(&mut character, &floor, 0.75);
        assert_eq!(character.phase(), LocomotionPhase::Sliding);
        run(&mut character, &floor, 0.0625);
        assert_eq!(character.phase(), LocomotionPhase::Moving);
        run(&mut character, &floor, 1.5);
        assert_relative_eq!(character.body().capsule_half_height(), 96.0);
        assert_relative_eq!(character.body().feet(), 0.0, epsilon = 1e-3);
        assert_eq!(CharacterBody::movement(character.body()), MovementParams::default());
    }

    #[test]
    fn test_killed_character_respawns_at_marker() {
        let (mut character, floor) = runner(LocomotionTuning::default());
        character.set_move_input(Vec3::X);
        run(&mut character, &floor, 1.0);
        assert!(character.position().x > 400.0);

        assert!(character.kill());
        assert!(!character.kill());
        assert!(Pawn::is_dead(&character));
        assert_eq!(character.clips().current_clip(), Some("AM_Death"));

        run(&mut character, &floor, 1.25);
        assert!(Pawn::is_dead(&character));
        run(&mut character, &floor, 0.25 + DT);
        assert!(!Pawn::is_dead(&character));
        assert_relative_eq!(character.position().x, 200.0);
        assert_eq!(character.locomotion().deaths(), 1);
    }

    #[test]
    fn test_falling_below_kill_height() {
        let (mut character, _) = runner(LocomotionTuning::default().with_kill_z(-500.0));
        let pit = Floor::flat(0.0).with_gap(0.0, 10_000.0);
        run(&mut character, &pit, 2.0);
        assert!(Pawn::is_dead(&character));
        assert!(character.position().z < -500.0 + 96.0);
    }

    #[test]
    fn test_freeze_and_camera() {
        let (mut character, floor) = runner(LocomotionTuning::default());
        character.set_rotation(gauntlet_core::math::yaw_rotation(90.0));
        character.update(DT, &floor, &[]);
        assert_relative_eq!(character.camera_boom().unwrap().yaw, 90.0, epsilon = 1e-3);

        character.set_move_input(Vec3::X);
        run(&mut character, &floor, 0.5);
        character.freeze();
        let frozen_at = character.position();
        run(&mut character, &floor, 0.5);
        assert_eq!(character.position(), frozen_at);
        assert_eq!(character.velocity(), Vec3::ZERO);
    }
}
