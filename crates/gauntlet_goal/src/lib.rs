//! Gauntlet Goal - the finish line
//!
//! A player-only volume that freezes whoever reaches it, plays a short
//! celebration and then asks the course for the next level.
//!
//! # Features
//!
//! - Player pawns only, first arrival wins
//! - Eased 360° camera orbit around the frozen player
//! - Plain delay alternative
//! - Missing next level is a warning, never an error
//!
//! # Example
//!
//! ```ignore
//! use gauntlet_goal::prelude::*;
//!
//! let goal = GoalVolume::new(GoalConfig::default().with_next_level("Level_02"));
//! course.add_behavior(Box::new(goal), finish_line)?;
//! ```

pub mod config;
pub mod volume;

pub mod prelude {
    pub use crate::config::{DelaySequence, GoalConfig, GoalSequence, OrbitSequence};
    pub use crate::volume::{GoalState, GoalVolume};
}

pub use prelude::*;
