//! Gauntlet Locomotion - ability state machine for the controlled character
//!
//! Owns the dash and slide abilities, their cooldowns, the slide recovery
//! that eases the capsule back to full height, and the death / respawn
//! cycle.
//!
//! # Features
//!
//! - Mutually exclusive, ground-only dash and slide
//! - Cooldowns driven by an owned timer service, cancelled on death
//! - Capsule and mesh restoration without overshoot
//! - Death by lethal obstacle, kill height or long falls (jump pads exempt)
//! - Respawn from an animation marker or a fallback delay
//!
//! # Example
//!
//! ```ignore
//! use gauntlet_locomotion::prelude::*;
//!
//! let mut machine = LocomotionMachine::new(player, LocomotionTuning::default());
//! machine.begin_play(&body);
//!
//! let mut cx = LocomotionContext::new(&mut body, &mut animator);
//! machine.request_dash(&mut cx);
//! machine.tick(dt, &mut cx);
//! ```

pub mod machine;
pub mod state;
pub mod tuning;

pub mod prelude {
    pub use crate::machine::{LocomotionContext, LocomotionMachine, LocomotionTimer};
    pub use crate::state::{BodyDefaults, LocomotionPhase, LocomotionState};
    pub use crate::tuning::LocomotionTuning;
}

pub use prelude::*;
