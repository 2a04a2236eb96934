//! Serializable obstacle descriptions
//!
//! Layout files describe each obstacle as a tagged config; building one
//! validates it and produces the boxed behavior the course drives.

use crate::behavior::{Behavior, ObstacleKind};
use crate::cannon::{Cannon, CannonConfig};
use crate::conveyor_belt::{ConveyorBelt, ConveyorBeltConfig};
use crate::ice_surface::{IceSurface, IceSurfaceConfig};
use crate::jump_pad::{JumpPad, JumpPadConfig};
use crate::laser_beam::{LaserBeam, LaserBeamConfig};
use crate::moving_platform::{MovingPlatform, MovingPlatformConfig};
use crate::pendulum::{Pendulum, PendulumConfig};
use crate::rotating_pillar::{RotatingPillar, RotatingPillarConfig};
use crate::trap_floor::{TrapFloor, TrapFloorConfig};
use gauntlet_core::config::Validate;
use gauntlet_core::error::Result;
use serde::{Deserialize, Serialize};

/// One placeable obstacle and its tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObstacleConfig {
    MovingPlatform(MovingPlatformConfig),
    Pendulum(PendulumConfig),
    RotatingPillar(RotatingPillarConfig),
    TrapFloor(TrapFloorConfig),
    LaserBeam(LaserBeamConfig),
    JumpPad(JumpPadConfig),
    ConveyorBelt(ConveyorBeltConfig),
    IceSurface(IceSurfaceConfig),
    Cannon(CannonConfig),
}

impl ObstacleConfig {
    /// Which obstacle this describes
    pub fn kind(&self) -> ObstacleKind {
        match self {
            Self::MovingPlatform(_) => ObstacleKind::MovingPlatform,
            Self::Pendulum(_) => ObstacleKind::Pendulum,
            Self::RotatingPillar(_) => ObstacleKind::RotatingPillar,
            Self::TrapFloor(_) => ObstacleKind::TrapFloor,
            Self::LaserBeam(_) => ObstacleKind::LaserBeam,
            Self::JumpPad(_) => ObstacleKind::JumpPad,
            Self::ConveyorBelt(_) => ObstacleKind::ConveyorBelt,
            Self::IceSurface(_) => ObstacleKind::IceSurface,
            Self::Cannon(_) => ObstacleKind::Cannon,
        }
    }

    /// Behavior for an already validated config
    pub fn into_behavior(self) -> Box<dyn Behavior> {
        match self {
            Self::MovingPlatform(config) => Box::new(MovingPlatform::new(config)),
            Self::Pendulum(config) => Box::new(Pendulum::new(config)),
            Self::RotatingPillar(config) => Box::new(RotatingPillar::new(config)),
            Self::TrapFloor(config) => Box::new(TrapFloor::new(config)),
            Self::LaserBeam(config) => Box::new(LaserBeam::new(config)),
            Self::JumpPad(config) => Box::new(JumpPad::new(config)),
            Self::ConveyorBelt(config) => Box::new(ConveyorBelt::new(config)),
            Self::IceSurface(config) => Box::new(IceSurface::new(config)),
            Self::Cannon(config) => Box::new(Cannon::new(config)),
        }
    }

    /// Validate, then build the behavior
    pub fn build(self) -> Result<Box<dyn Behavior>> {
        Ok(self.validated()?.into_behavior())
    }
}

impl Validate for ObstacleConfig {
    fn validated(self) -> Result<Self> {
        Ok(match self {
            Self::MovingPlatform(config) => Self::MovingPlatform(config.validated()?),
            Self::Pendulum(config) => Self::Pendulum(config.validated()?),
            Self::RotatingPillar(config) => Self::RotatingPillar(config.validated()?),
            Self::TrapFloor(config) => Self::TrapFloor(config.validated()?),
            Self::LaserBeam(config) => Self::LaserBeam(config.validated()?),
            Self::JumpPad(config) => Self::JumpPad(config.validated()?),
            Self::ConveyorBelt(config) => Self::ConveyorBelt(config.validated()?),
            Self::IceSurface(config) => Self::IceSurface(config.validated()?),
            Self::Cannon(config) => Self::Cannon(config.validated()?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauntlet_core::error::ConfigError;

    #[test]
    fn test_tagged_json_with_defaults() {
        let json = r#"[
            {"type": "pendulum", "swing_angle": 60.0},
            {"type": "laser_beam"},
            {"type": "trap_floor", "respawn_delay": null}
        ]"#;
        let configs: Vec<ObstacleConfig> = serde_json::from_str(json).unwrap();

        let ObstacleConfig::Pendulum(pendulum) = &configs[0] else {
            panic!("expected a pendulum");
        };
        assert_eq!(pendulum.swing_angle, 60.0);
        assert_eq!(pendulum.arm_length, PendulumConfig::default().arm_length);
        assert_eq!(configs[1], ObstacleConfig::LaserBeam(LaserBeamConfig::default()));
        assert_eq!(configs[2], ObstacleConfig::TrapFloor(TrapFloorConfig::default().single_use()));
    }

    #[test]
    fn test_build_clamps_and_rejects() {
        let clamped = ObstacleConfig::Pendulum(PendulumConfig {
            swing_angle: 170.0,
            ..Default::default()
        })
        .validated()
        .unwrap();
        let ObstacleConfig::Pendulum(pendulum) = clamped else {
            panic!("expected a pendulum");
        };
        assert_eq!(pendulum.swing_angle, 90.0);

        let broken = ObstacleConfig::Cannon(CannonConfig {
            launch_speed: f32::NAN,
            ..Default::default()
        });
        assert_eq!(
            broken.build().unwrap_err(),
            ConfigError::NonFinite { field: "launch_speed" }
        );
    }

    #[test]
    fn test_behavior_kind_matches() {
        let configs = [
            ObstacleConfig::MovingPlatform(Default::default()),
            ObstacleConfig::RotatingPillar(Default::default()),
            ObstacleConfig::JumpPad(Default::default()),
            ObstacleConfig::ConveyorBelt(Default::default()),
            ObstacleConfig::IceSurface(Default::default()),
            ObstacleConfig::Cannon(Default::default()),
        ];
        for config in configs {
            let kind = config.kind();
            assert_eq!(config.build().unwrap().kind(), kind);
        }
    }
}
