//! Gauntlet Triggers - overlap volume system
//!
//! Detects bodies entering and leaving obstacle volumes and turns that into
//! an ordered enter/exit event feed.
//!
//! # Features
//!
//! - Box and sphere volumes, rotation aware
//! - Bodies tested as spheres or upright capsules
//! - Tag and entity filtering, never the volume's own owner
//! - Disabling a trigger forgets its overlaps, so re-enabling reports fresh
//!   enters for bodies already inside
//!
//! # Example
//!
//! ```ignore
//! use gauntlet_triggers::prelude::*;
//!
//! let trigger = TriggerComponent::new(TriggerVolume::sphere(100.0))
//!     .with_filter(TriggerFilter::pawns_only());
//! system.register_trigger(pendulum, trigger);
//! system.update(&poses, &bodies);
//! for event in system.drain_events() { /* dispatch */ }
//! ```

pub mod events;
pub mod filter;
pub mod system;
pub mod trigger;
pub mod volume;

pub mod prelude {
    pub use crate::events::{TriggerEvent, TriggerEventType};
    pub use crate::filter::{TriggerFilter, PAWN_TAG, PLAYER_TAG};
    pub use crate::system::{TriggerEntity, TriggerPose, TriggerSystem};
    pub use crate::trigger::TriggerComponent;
    pub use crate::volume::TriggerVolume;
}

pub use prelude::*;
