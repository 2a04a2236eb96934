//! Locomotion state

use gauntlet_core::body::{CharacterBody, MovementParams};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Which maneuver the character is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocomotionPhase {
    /// Idle or running under normal movement
    Moving,
    /// Dash animation playing
    Dashing,
    /// Slide animation playing
    Sliding,
    /// Dead until respawn
    Dead,
}

/// Movement and shape values restored after a maneuver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyDefaults {
    /// Movement parameters
    pub movement: MovementParams,
    /// Capsule half-height
    pub capsule_half_height: f32,
    /// Mesh offset relative to the capsule centre
    pub mesh_offset: Vec3,
}

impl BodyDefaults {
    /// Snapshot a body's current values
    pub fn capture(body: &dyn CharacterBody) -> Self {
        Self {
            movement: body.movement(),
            capsule_half_height: body.capsule_half_height(),
            mesh_offset: body.mesh_offset(),
        }
    }

    /// Write the snapshot back onto a body
    pub fn apply(&self, body: &mut dyn CharacterBody) {
        body.set_movement(self.movement);
        body.set_capsule_half_height(self.capsule_half_height);
        body.set_mesh_offset(self.mesh_offset);
    }
}

impl Default for BodyDefaults {
    fn default() -> Self {
        Self {
            movement: MovementParams::default(),
            capsule_half_height: 96.0,
            mesh_offset: Vec3::new(0.0, 0.0, -96.0),
        }
    }
}

/// Per-character locomotion flags and cached values.
///
/// At most one of `is_dashing` and `is_sliding` is set. `can_dash` is false
/// from the start of a dash until its cooldown expires; `can_slide` likewise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocomotionState {
    pub is_dead: bool,
    pub is_dashing: bool,
    pub is_sliding: bool,
    pub can_dash: bool,
    pub can_slide: bool,
    /// Thrown by a jump pad and not yet landed
    pub jump_pad_launched: bool,
    /// Values snapshotted when the last slide started
    pub defaults: BodyDefaults,
    /// Capsule and mesh easing back after a slide
    pub restoring_capsule: bool,
    pub target_capsule_half_height: f32,
    pub target_mesh_offset: Vec3,
    /// Spawn pose restored on respawn
    pub start_location: Vec3,
    pub start_rotation: Quat,
    /// Seconds since the body last stood on ground
    pub air_time: f32,
}

impl Default for LocomotionState {
    fn default() -> Self {
        let defaults = BodyDefaults::default();
        Self {
            is_dead: false,
            is_dashing: false,
            is_sliding: false,
            can_dash: true,
            can_slide: true,
            jump_pad_launched: false,
            defaults,
            restoring_capsule: false,
            target_capsule_half_height: defaults.capsule_half_height,
            target_mesh_offset: defaults.mesh_offset,
            start_location: Vec3::ZERO,
            start_rotation: Quat::IDENTITY,
            air_time: 0.0,
        }
    }
}

impl LocomotionState {
    /// Current phase
    pub fn phase(&self) -> LocomotionPhase {
        if self.is_dead {
            LocomotionPhase::Dead
        } else if self.is_dashing {
            LocomotionPhase::Dashing
        } else if self.is_sliding {
            LocomotionPhase::Sliding
        } else {
            LocomotionPhase::Moving
        }
    }

    /// Whether a dash may start (ground contact is checked separately)
    pub fn dash_allowed(&self) -> bool {
        !self.is_dead && self.can_dash && !self.is_dashing && !self.is_sliding
    }

    /// Whether a slide may start (ground contact is checked separately)
    pub fn slide_allowed(&self) -> bool {
        !self.is_dead && self.can_slide && !self.is_sliding && !self.is_dashing
    }

    /// Clear maneuvers and make both abilities ready
    pub fn reset_abilities(&mut self) {
        self.is_dashing = false;
        self.is_sliding = false;
        self.can_dash = true;
        self.can_slide = true;
        self.restoring_capsule = false;
        self.jump_pad_launched = false;
        self.air_time = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_priority() {
        let mut state = LocomotionState::default();
        assert_eq!(state.phase(), LocomotionPhase::Moving);

        state.is_sliding = true;
        assert_eq!(state.phase(), LocomotionPhase::Sliding);

        state.is_dead = true;
        assert_eq!(state.phase(), LocomotionPhase::Dead);
    }

    #[test]
    fn test_maneuvers_exclude_each_other() {
        let mut state = LocomotionState::default();
        assert!(state.dash_allowed());
        assert!(state.slide_allowed());

        state.is_dashing = true;
        assert!(!state.slide_allowed());

        state.is_dashing = false;
        state.is_sliding = true;
        assert!(!state.dash_allowed());

        state.reset_abilities();
        state.is_dead = true;
        assert!(!state.dash_allowed());
        assert!(!state.slide_allowed());
    }
}
