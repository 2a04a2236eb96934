//! Kinematic character body
//!
//! A capsule moved by a small walking model: input acceleration capped at
//! the walking speed, braking plus speed-proportional friction without
//! input (or above the cap), gravity while airborne. Ground is the highest
//! support under the capsule that is no more than a step above the feet.

use crate::floor::Floor;
use gauntlet_core::body::{apply_launch, Body, CharacterBody, MovementParams};
use gauntlet_core::config::{at_least, clamped, Validate};
use gauntlet_core::error::Result;
use gauntlet_core::id::EntityId;
use gauntlet_obstacles::Surface;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Highest ledge the capsule steps onto without jumping
const MAX_STEP_HEIGHT: f32 = 45.0;

/// Distance a grounded body sticks to a support dropping away under it
const GROUND_SNAP: f32 = 10.0;

/// Furthest drop a spawn is moved down onto the ground
const SPAWN_SNAP: f32 = 500.0;

/// Physical settings of a character capsule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodySettings {
    /// Capsule radius
    pub capsule_radius: f32,
    /// Capsule half-height including the hemispheres
    pub capsule_half_height: f32,
    /// Input acceleration (units/s²)
    pub acceleration: f32,
    /// Downward acceleration while airborne
    pub gravity: f32,
    /// Upward speed of a jump
    pub jump_velocity: f32,
    /// Fraction of the acceleration available in the air
    pub air_control: f32,
    /// Walking parameters at spawn
    pub movement: MovementParams,
}

impl Default for BodySettings {
    fn default() -> Self {
        Self {
            capsule_radius: 42.0,
            capsule_half_height: 96.0,
            acceleration: 2048.0,
            gravity: 980.0,
            jump_velocity: 500.0,
            air_control: 0.35,
            movement: MovementParams::default(),
        }
    }
}

impl Validate for BodySettings {
    fn validated(mut self) -> Result<Self> {
        self.capsule_radius = at_least("capsule_radius", self.capsule_radius, 1.0)?;
        self.capsule_half_height = at_least("capsule_half_height", self.capsule_half_height, self.capsule_radius)?;
        self.acceleration = at_least("acceleration", self.acceleration, 0.0)?;
        self.gravity = at_least("gravity", self.gravity, 0.0)?;
        self.jump_velocity = at_least("jump_velocity", self.jump_velocity, 0.0)?;
        self.air_control = clamped("air_control", self.air_control, 0.0, 1.0)?;
        self.movement.max_speed = at_least("max_speed", self.movement.max_speed, 0.0)?;
        self.movement.ground_friction = at_least("ground_friction", self.movement.ground_friction, 0.0)?;
        self.movement.braking_deceleration =
            at_least("braking_deceleration", self.movement.braking_deceleration, 0.0)?;
        Ok(self)
    }
}

/// Something the capsule can stand on
#[derive(Debug, Clone, Copy, PartialEq)]
struct Support {
    height: f32,
    owner: Option<EntityId>,
}

/// Capsule body driven by [`KinematicBody::integrate`]
#[derive(Debug, Clone)]
pub struct KinematicBody {
    id: EntityId,
    settings: BodySettings,
    position: Vec3,
    rotation: Quat,
    velocity: Vec3,
    on_ground: bool,
    standing_on: Option<EntityId>,
    collision: bool,
    movement: MovementParams,
    capsule_half_height: f32,
    mesh_offset: Vec3,
    movement_enabled: bool,
    input_enabled: bool,
    input: Vec3,
}

impl KinematicBody {
    /// Body at `position` facing `rotation`, airborne until the first
    /// ground check
    pub fn new(id: EntityId, settings: BodySettings, position: Vec3, rotation: Quat) -> Self {
        let half_height = settings.capsule_half_height;
        Self {
            id,
            movement: settings.movement,
            settings,
            position,
            rotation,
            velocity: Vec3::ZERO,
            on_ground: false,
            standing_on: None,
            collision: true,
            capsule_half_height: half_height,
            mesh_offset: Vec3::new(0.0, 0.0, -half_height),
            movement_enabled: true,
            input_enabled: true,
            input: Vec3::ZERO,
        }
    }

    /// Physical settings
    pub fn settings(&self) -> &BodySettings {
        &self.settings
    }

    /// Capsule radius
    pub fn capsule_radius(&self) -> f32 {
        self.settings.capsule_radius
    }

    /// Height of the capsule bottom
    pub fn feet(&self) -> f32 {
        self.position.z - self.capsule_half_height
    }

    /// Surface owner under the feet, `None` on the course floor or airborne
    pub fn standing_on(&self) -> Option<EntityId> {
        self.standing_on
    }

    /// Whether the movement model runs
    pub fn is_movement_enabled(&self) -> bool {
        self.movement_enabled
    }

    /// Whether move input is accepted
    pub fn is_input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// Desired move direction in world space, length up to 1
    pub fn move_input(&self) -> Vec3 {
        self.input
    }

    /// Set the desired move direction; ignored while input is disabled
    pub fn set_move_input(&mut self, input: Vec3) {
        if self.input_enabled {
            self.input = Vec3::new(input.x, input.y, 0.0).clamp_length_max(1.0);
        }
    }

    /// Jump if standing. Returns whether it jumped.
    pub fn jump(&mut self) -> bool {
        if !self.on_ground || !self.movement_enabled || !self.input_enabled {
            return false;
        }
        self.velocity.z = self.settings.jump_velocity;
        self.leave_ground();
        true
    }

    /// Drop a freshly placed body onto whatever is under it
    pub fn snap_to_ground(&mut self, floor: &Floor, surfaces: &[Surface]) -> bool {
        let feet = self.feet();
        match self.support_under(floor, surfaces, feet + MAX_STEP_HEIGHT) {
            Some(support) if feet - support.height <= SPAWN_SNAP => {
                self.land(support);
                true
            }
            _ => false,
        }
    }

    /// Advance one frame
    pub fn integrate(&mut self, dt: f32, floor: &Floor, surfaces: &[Surface]) {
        if !self.movement_enabled || dt <= 0.0 {
            return;
        }
        let previous_feet = self.feet();
        self.integrate_velocity(dt);
        self.position += self.velocity * dt;
        self.resolve_ground(previous_feet, floor, surfaces);
    }

    fn integrate_velocity(&mut self, dt: f32) {
        let input = if self.input_enabled { self.input } else { Vec3::ZERO };
        let has_input = input.length_squared() > 1.0e-6;
        let params = self.movement;
        let mut horizontal = Vec3::new(self.velocity.x, self.velocity.y, 0.0);

        if self.on_ground {
            let speed = horizontal.length();
            let over_max = speed > params.max_speed;
            if !has_input || over_max {
                let floor_speed = if has_input { params.max_speed } else { 0.0 };
                let deceleration = params.braking_deceleration + params.ground_friction * speed;
                let braked = (speed - deceleration * dt).max(floor_speed);
                horizontal = horizontal.normalize_or_zero() * braked;
            }
            if has_input {
                let direction = input.normalize();
                let speed = horizontal.length();
                // Friction steers the velocity toward the input
                let steer = (dt * params.ground_friction).min(1.0);
                horizontal -= (horizontal - direction * speed) * steer;
                horizontal += direction * self.settings.acceleration * dt;
                let limit = if over_max { speed } else { params.max_speed * input.length() };
                horizontal = horizontal.clamp_length_max(limit);
            }
            self.velocity = horizontal;
        } else {
            if has_input {
                let before = horizontal.length();
                horizontal += input.normalize() * self.settings.acceleration * self.settings.air_control * dt;
                horizontal = horizontal.clamp_length_max(before.max(params.max_speed));
            }
            self.velocity.x = horizontal.x;
            self.velocity.y = horizontal.y;
            self.velocity.z -= self.settings.gravity * dt;
        }
    }

    fn resolve_ground(&mut self, previous_feet: f32, floor: &Floor, surfaces: &[Surface]) {
        if !self.collision {
            self.leave_ground();
            return;
        }
        let snap = if self.on_ground { GROUND_SNAP } else { 0.0 };
        match self.support_under(floor, surfaces, previous_feet + MAX_STEP_HEIGHT) {
            Some(support) if self.velocity.z <= 0.0 && self.feet() <= support.height + snap => {
                self.land(support)
            }
            _ => self.leave_ground(),
        }
    }

    fn support_under(&self, floor: &Floor, surfaces: &[Surface], reach: f32) -> Option<Support> {
        let margin = self.settings.capsule_radius * 0.5;
        let floor_support = floor.height_at(self.position).map(|height| Support { height, owner: None });
        surfaces
            .iter()
            .filter(|surface| surface.supports(self.position, margin))
            .map(|surface| Support {
                height: surface.height(),
                owner: Some(surface.owner),
            })
            .chain(floor_support)
            .filter(|support| support.height <= reach)
            .max_by(|a, b| a.height.total_cmp(&b.height))
    }

    fn land(&mut self, support: Support) {
        if !self.on_ground {
            log::trace!("{} landed at {:.1}", self.id, support.height);
        }
        self.position.z = support.height + self.capsule_half_height;
        self.velocity.z = 0.0;
        self.on_ground = true;
        self.standing_on = support.owner;
    }

    fn leave_ground(&mut self) {
        self.on_ground = false;
        self.standing_on = None;
    }
}

impl Body for KinematicBody {
    fn id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn launch(&mut self, velocity: Vec3, override_xy: bool, override_z: bool) {
        self.velocity = apply_launch(self.velocity, velocity, override_xy, override_z);
        if self.velocity.z > 0.0 {
            self.leave_ground();
        }
    }

    fn is_on_ground(&self) -> bool {
        self.on_ground
    }

    fn set_collision_enabled(&mut self, enabled: bool) {
        self.collision = enabled;
    }

    fn is_collision_enabled(&self) -> bool {
        self.collision
    }

    fn add_world_offset(&mut self, offset: Vec3) {
        self.position += offset;
    }
}

impl CharacterBody for KinematicBody {
    fn movement(&self) -> MovementParams {
        self.movement
    }

    fn set_movement(&mut self, params: MovementParams) {
        self.movement = params;
    }

    fn capsule_half_height(&self) -> f32 {
        self.capsule_half_height
    }

    fn set_capsule_half_height(&mut self, half_height: f32) {
        // Feet stay planted on a resize
        if self.on_ground {
            self.position.z += half_height - self.capsule_half_height;
        }
        self.capsule_half_height = half_height;
    }

    fn mesh_offset(&self) -> Vec3 {
        self.mesh_offset
    }

    fn set_mesh_offset(&mut self, offset: Vec3) {
        self.mesh_offset = offset;
    }

    fn stop_movement(&mut self) {
        self.velocity = Vec3::ZERO;
    }

    fn set_movement_enabled(&mut self, enabled: bool) {
        self.movement_enabled = enabled;
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
        if !enabled {
            self.input = Vec3::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use gauntlet_core::scene::Transform;

    const DT: f32 = 1.0 / 64.0;

    fn grounded(x: f32) -> (KinematicBody, Floor) {
        let floor = Floor::flat(0.0);
        let mut body = KinematicBody::new(
            EntityId::new(1, 0),
            BodySettings::default(),
            Vec3::new(x, 0.0, 100.0),
            Quat::IDENTITY,
        );
        assert!(body.snap_to_ground(&floor, &[]));
        (body, floor)
    }

    fn run(body: &mut KinematicBody, floor: &Floor, surfaces: &[Surface], frames: usize) {
        for _ in 0..frames {
            body.integrate(DT, floor, surfaces);
        }
    }

    #[test]
    fn test_walks_up_to_max_speed() {
        let (mut body, floor) = grounded(0.0);
        assert_relative_eq!(body.position().z, 96.0);

        body.set_move_input(Vec3::X);
        run(&mut body, &floor, &[], 64);
        assert_relative_eq!(body.velocity().x, 500.0, epsilon = 1e-3);
        assert!(body.is_on_ground());
        assert_relative_eq!(body.position().z, 96.0);
    }

    #[test]
    fn test_brakes_to_a_stop() {
        let (mut body, floor) = grounded(0.0);
        body.launch(Vec3::new(500.0, 0.0, 0.0), true, true);
        body.set_move_input(Vec3::ZERO);
        run(&mut body, &floor, &[], 16);
        assert_eq!(body.velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_over_max_speed_decays_to_walking() {
        let (mut body, floor) = grounded(0.0);
        body.set_move_input(Vec3::X);
        body.launch(Vec3::new(1500.0, 0.0, 0.0), true, true);
        body.integrate(DT, &floor, &[]);
        assert!(body.velocity().x < 1500.0);
        assert!(body.velocity().x > 500.0);

        run(&mut body, &floor, &[], 32);
        assert_relative_eq!(body.velocity().x, 500.0, epsilon = 1e-3);
    }

    #[test]
    fn test_falls_through_gap_and_lands_beyond() {
        let floor = Floor::flat(0.0).with_gap(0.0, 100.0);
        let mut body = KinematicBody::new(
            EntityId::new(1, 0),
            BodySettings::default(),
            Vec3::new(50.0, 0.0, 96.0),
            Quat::IDENTITY,
        );
        run(&mut body, &floor, &[], 32);
        assert!(!body.is_on_ground());
        assert!(body.position().z < 96.0);

        // Ground that was above the feet is not stepped onto from below
        body.set_position(Vec3::new(150.0, 0.0, body.position().z));
        body.integrate(DT, &floor, &[]);
        assert!(!body.is_on_ground());
    }

    #[test]
    fn test_lands_from_a_jump() {
        let (mut body, floor) = grounded(0.0);
        assert!(body.jump());
        assert!(!body.jump());
        assert!(!body.is_on_ground());

        let mut frames = 0;
        while !body.is_on_ground() {
            body.integrate(DT, &floor, &[]);
            frames += 1;
            assert!(frames < 200);
        }
        // 2 * 500 / 980 s in the air
        assert_relative_eq!(frames as f32 * DT, 1000.0 / 980.0, epsilon = 2.0 * DT);
        assert_relative_eq!(body.position().z, 96.0);
    }

    #[test]
    fn test_stands_on_surfaces() {
        let (mut body, floor) = grounded(0.0);
        let owner = EntityId::new(7, 0);
        let step = Surface::deck(
            owner,
            &Transform::from_translation(Vec3::new(400.0, 0.0, 0.0)),
            Vec3::new(150.0, 100.0, 20.0),
        );

        body.set_move_input(Vec3::X);
        run(&mut body, &floor, &[step], 48);
        assert!(body.is_on_ground());
        assert_eq!(body.standing_on(), Some(owner));
        assert_relative_eq!(body.feet(), 20.0);

        run(&mut body, &floor, &[step], 64);
        assert_eq!(body.standing_on(), None);
        assert_relative_eq!(body.feet(), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_capsule_resize_keeps_feet() {
        let (mut body, _) = grounded(0.0);
        body.set_capsule_half_height(48.0);
        assert_relative_eq!(body.feet(), 0.0);
        assert_relative_eq!(body.position().z, 48.0);
        body.set_capsule_half_height(96.0);
        assert_relative_eq!(body.position().z, 96.0);
    }

    #[test]
    fn test_disabled_movement_holds_still() {
        let floor = Floor::flat(0.0);
        let mut body = KinematicBody::new(
            EntityId::new(1, 0),
            BodySettings::default(),
            Vec3::new(0.0, 0.0, 500.0),
            Quat::IDENTITY,
        );
        body.set_movement_enabled(false);
        body.set_input_enabled(false);
        body.set_move_input(Vec3::X);
        run(&mut body, &floor, &[], 32);
        assert_eq!(body.position(), Vec3::new(0.0, 0.0, 500.0));
        assert_eq!(body.move_input(), Vec3::ZERO);
    }
}
