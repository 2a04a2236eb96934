//! Gauntlet Timer - delayed and repeating events for gameplay entities
//!
//! Timers are keyed by `(owner, tag)`. Nothing runs inside the scheduler:
//! [`TimerService::advance`] hands back the events that came due, in order,
//! and the caller routes them to their owners during the same update pass.
//!
//! # Features
//!
//! - One-shot and fixed-period repeating timers
//! - Rescheduling an `(owner, tag)` pair restarts it
//! - Cancellation by handle, by tag, or for every timer an entity owns
//! - Deterministic firing order (due time, then scheduling order)
//!
//! # Example
//!
//! ```ignore
//! use gauntlet_timer::prelude::*;
//!
//! let mut timers = TimerService::new();
//! timers.schedule_repeating(cannon, 2.0, BehaviorTimer::Fire);
//! for fired in timers.advance(dt) {
//!     route(fired.owner, fired.tag);
//! }
//! ```

pub mod service;

pub mod prelude {
    pub use crate::service::{TimerFired, TimerHandle, TimerService};
}

pub use prelude::*;
