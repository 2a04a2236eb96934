//! Gauntlet Course - the headless obstacle course runtime
//!
//! Puts the pieces together: a floor with gaps, kinematic characters driven
//! by the locomotion machine, obstacles and the goal, one shared timer
//! service and one trigger system, all advanced by [`Course::step`].
//!
//! # Features
//!
//! - Fixed frame order: input, characters, timers, obstacles, contacts,
//!   overlaps, deferred world commands
//! - Kinematic capsule bodies standing on the floor and on obstacle decks
//! - Clip timelines with markers feeding the locomotion machine
//! - Auto-run game mode
//! - JSON course layouts and the built-in first level
//!
//! # Example
//!
//! ```ignore
//! use gauntlet_course::prelude::*;
//!
//! let mut course = CourseLayout::level_one().build()?;
//! while course.pending_level().is_none() {
//!     course.step(1.0 / 60.0);
//! }
//! ```

pub mod body;
pub mod character;
pub mod clip;
pub mod course;
pub mod error;
pub mod floor;
pub mod game_mode;
pub mod layout;

pub mod prelude {
    pub use crate::body::{BodySettings, KinematicBody};
    pub use crate::character::Character;
    pub use crate::clip::{standard_clips, ClipDef, ClipLibrary, ClipNotify, ClipPlayer};
    pub use crate::course::Course;
    pub use crate::error::{CourseError, Result};
    pub use crate::floor::{Floor, Gap};
    pub use crate::game_mode::{GameMode, GameModeConfig};
    pub use crate::layout::{CourseLayout, GoalPlacement, Placement, PlayerLayout};
}

pub use prelude::*;
