//! Gauntlet Core - shared contracts for the obstacle course gameplay
//!
//! Everything the locomotion machine, the obstacles and the course runtime
//! agree on lives here.
//!
//! # Features
//!
//! - Generational entity handles with an allocator
//! - Body, character and pawn contracts decoupled from any physics backend
//! - Scene graph owning transforms apart from behavior
//! - Animation playback contract with completion tokens
//! - Knockback, interpolation and easing helpers
//! - Load-time validation of tunables
//!
//! # Example
//!
//! ```ignore
//! use gauntlet_core::prelude::*;
//!
//! let dir = knockback_direction(Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0));
//! pawn.launch(dir * 1500.0, true, true);
//! ```

pub mod animation;
pub mod body;
pub mod config;
pub mod error;
pub mod id;
pub mod math;
pub mod scene;

pub use glam;

pub mod prelude {
    pub use crate::animation::{AnimationController, AnimationEvent, PlaybackId, RESPAWN_NOTIFY};
    pub use crate::body::{
        apply_launch, Body, CameraBoom, CharacterBody, MovementParams, NoPawns, Pawn,
        PawnRegistry,
    };
    pub use crate::config::Validate;
    pub use crate::error::ConfigError;
    pub use crate::id::{EntityAllocator, EntityId};
    pub use crate::math::{
        ease_in_out, interp_to, knockback_direction, knockback_velocity, pitch_rotation,
        triangle_wave, vinterp_to, yaw_degrees, yaw_rotation,
    };
    pub use crate::scene::{SceneGraph, Transform};
    pub use glam::{Quat, Vec3};
}

pub use prelude::*;
