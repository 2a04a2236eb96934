//! Gauntlet Obstacles - reactive hazards and helpers along the course
//!
//! Each obstacle is a [`Behavior`]: tunables plus a little state, driven by
//! ticks, overlap enters and exits, contacts and its own timers. Obstacles
//! never own transforms or pawns; they act through a [`BehaviorContext`].
//!
//! # Features
//!
//! - Moving platforms, pendulums and rotating pillars
//! - Trap floors that drop and come back
//! - Blinking laser beams
//! - Jump pads, conveyor belts and ice
//! - Cannons firing ballistic cannonballs
//! - Tagged, serde-friendly configs validated once at load
//!
//! # Example
//!
//! ```ignore
//! use gauntlet_obstacles::prelude::*;
//!
//! let config: ObstacleConfig = serde_json::from_str(r#"{"type": "pendulum"}"#)?;
//! let mut pendulum = config.build()?;
//! pendulum.begin_play(&mut cx);
//! pendulum.tick(dt, &mut cx);
//! ```

pub mod behavior;
pub mod cannon;
pub mod cannonball;
pub mod conveyor_belt;
pub mod ice_surface;
pub mod jump_pad;
pub mod laser_beam;
pub mod moving_platform;
pub mod obstacle;
pub mod pendulum;
pub mod rotating_pillar;
pub mod trap_floor;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub mod prelude {
    pub use crate::behavior::{
        Behavior, BehaviorContext, BehaviorTimer, ObstacleKind, SpawnRequest, Surface, WorldCommand,
    };
    pub use crate::cannon::{Cannon, CannonConfig};
    pub use crate::cannonball::{Cannonball, CannonballConfig};
    pub use crate::conveyor_belt::{ConveyorBelt, ConveyorBeltConfig};
    pub use crate::ice_surface::{IceSurface, IceSurfaceConfig};
    pub use crate::jump_pad::{JumpPad, JumpPadConfig};
    pub use crate::laser_beam::{LaserBeam, LaserBeamConfig};
    pub use crate::moving_platform::{MovingPlatform, MovingPlatformConfig};
    pub use crate::obstacle::ObstacleConfig;
    pub use crate::pendulum::{Pendulum, PendulumConfig};
    pub use crate::rotating_pillar::{RotatingPillar, RotatingPillarConfig};
    pub use crate::trap_floor::{TrapFloor, TrapFloorConfig, TrapFloorState};
}

pub use prelude::*;
