//! Contracts between gameplay logic and whatever moves the bodies
//!
//! Collision, integration and input routing live outside the gameplay core.
//! Locomotion and obstacles only see these traits.

use crate::id::EntityId;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Movement-model parameters obstacles and abilities temporarily override
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementParams {
    /// Maximum walking speed (units/s)
    pub max_speed: f32,
    /// Ground friction coefficient
    pub ground_friction: f32,
    /// Walking braking deceleration (units/s²)
    pub braking_deceleration: f32,
}

impl Default for MovementParams {
    fn default() -> Self {
        Self {
            max_speed: 500.0,
            ground_friction: 8.0,
            braking_deceleration: 2000.0,
        }
    }
}

/// A simulated body: pose, velocity, ground contact, collision toggle
pub trait Body {
    /// Entity this body belongs to
    fn id(&self) -> EntityId;

    /// World position (capsule centre for characters)
    fn position(&self) -> Vec3;

    /// Teleport to a world position
    fn set_position(&mut self, position: Vec3);

    /// World rotation
    fn rotation(&self) -> Quat;

    /// Set world rotation
    fn set_rotation(&mut self, rotation: Quat);

    /// Forward axis of the current rotation
    fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::X
    }

    /// Current velocity
    fn velocity(&self) -> Vec3;

    /// Override (or add to) velocity, bypassing movement-mode deceleration.
    ///
    /// `override_xy` replaces the horizontal components instead of adding,
    /// `override_z` does the same for the vertical one.
    fn launch(&mut self, velocity: Vec3, override_xy: bool, override_z: bool);

    /// Whether the body is standing on walkable ground
    fn is_on_ground(&self) -> bool;

    /// Enable or disable collision response
    fn set_collision_enabled(&mut self, enabled: bool);

    /// Whether collision response is enabled
    fn is_collision_enabled(&self) -> bool;

    /// Displace in world space without touching velocity
    fn add_world_offset(&mut self, offset: Vec3);
}

/// The extra knobs the locomotion state machine drives on its own body
pub trait CharacterBody: Body {
    /// Current movement parameters
    fn movement(&self) -> MovementParams;

    /// Replace movement parameters
    fn set_movement(&mut self, params: MovementParams);

    /// Collision capsule half-height
    fn capsule_half_height(&self) -> f32;

    /// Resize the collision capsule
    fn set_capsule_half_height(&mut self, half_height: f32);

    /// Visual mesh offset relative to the capsule centre
    fn mesh_offset(&self) -> Vec3;

    /// Move the visual mesh relative to the capsule
    fn set_mesh_offset(&mut self, offset: Vec3);

    /// Zero velocity immediately
    fn stop_movement(&mut self);

    /// Enable or disable the movement model entirely
    fn set_movement_enabled(&mut self, enabled: bool);

    /// Enable or disable player input
    fn set_input_enabled(&mut self, enabled: bool);
}

/// Spring arm holding the follow camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraBoom {
    /// World yaw in degrees
    pub yaw: f32,
    /// World pitch in degrees
    pub pitch: f32,
    /// Distance from pawn to camera
    pub arm_length: f32,
    /// Follow the controller rotation
    pub use_pawn_control_rotation: bool,
    /// Positional lag smoothing
    pub camera_lag: bool,
    /// Rotational lag smoothing
    pub rotation_lag: bool,
}

impl Default for CameraBoom {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            arm_length: 400.0,
            use_pawn_control_rotation: true,
            camera_lag: false,
            rotation_lag: false,
        }
    }
}

/// What obstacles are allowed to do to a character
pub trait Pawn: Body {
    /// Current movement parameters
    fn movement(&self) -> MovementParams;

    /// Replace movement parameters
    fn set_movement(&mut self, params: MovementParams);

    /// Whether a player controls this pawn
    fn is_player_controlled(&self) -> bool;

    /// Whether the pawn is dead
    fn is_dead(&self) -> bool;

    /// Kill the pawn. Returns false if it was already dead.
    fn kill(&mut self) -> bool;

    /// Tell the pawn it was thrown by a jump pad
    fn mark_jump_pad_launched(&mut self);

    /// Stop and disable movement and input
    fn freeze(&mut self);

    /// Follow camera, if the pawn has one
    fn camera_boom_mut(&mut self) -> Option<&mut CameraBoom>;
}

/// Lookup of pawns by handle.
///
/// `None` covers both "not a pawn" and "no longer exists"; callers treat the
/// two the same way and ignore the event.
pub trait PawnRegistry {
    /// Mutable access to a pawn
    fn pawn_mut(&mut self, id: EntityId) -> Option<&mut dyn Pawn>;

    /// Whether a live pawn has this handle
    fn contains(&self, id: EntityId) -> bool;
}

/// Registry with no pawns in it
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPawns;

impl PawnRegistry for NoPawns {
    fn pawn_mut(&mut self, _id: EntityId) -> Option<&mut dyn Pawn> {
        None
    }

    fn contains(&self, _id: EntityId) -> bool {
        false
    }
}

/// Apply launch override semantics to a velocity
pub fn apply_launch(current: Vec3, launch: Vec3, override_xy: bool, override_z: bool) -> Vec3 {
    let mut result = current;
    if override_xy {
        result.x = launch.x;
        result.y = launch.y;
    } else {
        result.x += launch.x;
        result.y += launch.y;
    }
    if override_z {
        result.z = launch.z;
    } else {
        result.z += launch.z;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_override_flags() {
        let current = Vec3::new(100.0, 50.0, -200.0);
        let launch = Vec3::new(0.0, 0.0, 1500.0);

        assert_eq!(apply_launch(current, launch, true, true), Vec3::new(0.0, 0.0, 1500.0));
        assert_eq!(apply_launch(current, launch, false, true), Vec3::new(100.0, 50.0, 1500.0));
        assert_eq!(apply_launch(current, launch, false, false), Vec3::new(100.0, 50.0, 1300.0));
    }

    #[test]
    fn test_no_pawns_resolves_nothing() {
        let mut registry = NoPawns;
        let id = EntityId::new(1, 0);
        assert!(registry.pawn_mut(id).is_none());
        assert!(!registry.contains(id));
    }
}
