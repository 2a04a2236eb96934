//! Rotating pillar
//!
//! A post with an arm sweeping around the top. The arm's hit box knocks
//! bodies away from the pillar's base.

use crate::behavior::{Behavior, BehaviorContext, ObstacleKind};
use gauntlet_core::config::{at_least, Validate};
use gauntlet_core::error::Result;
use gauntlet_core::id::EntityId;
use gauntlet_core::math::{knockback_velocity, yaw_rotation};
use gauntlet_core::scene::Transform;
use gauntlet_triggers::{TriggerComponent, TriggerFilter, TriggerVolume};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Half thickness of the arm's hit box
const ARM_HALF_THICKNESS: f32 = 30.0;

/// Rotating pillar tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotatingPillarConfig {
    /// Height of the arm above the base
    pub pillar_height: f32,
    /// Degrees per second
    pub rotation_speed: f32,
    /// Spin clockwise seen from above
    pub clockwise: bool,
    /// Knockback speed on hit
    pub knockback_force: f32,
    /// Arm reach from the pillar axis
    pub arm_length: f32,
}

impl Default for RotatingPillarConfig {
    fn default() -> Self {
        Self {
            pillar_height: 150.0,
            rotation_speed: 90.0,
            clockwise: true,
            knockback_force: 1500.0,
            arm_length: 300.0,
        }
    }
}

impl Validate for RotatingPillarConfig {
    fn validated(mut self) -> Result<Self> {
        self.pillar_height = at_least("pillar_height", self.pillar_height, 10.0)?;
        self.rotation_speed = at_least("rotation_speed", self.rotation_speed, 0.0)?;
        self.knockback_force = at_least("knockback_force", self.knockback_force, 0.0)?;
        self.arm_length = at_least("arm_length", self.arm_length, 50.0)?;
        Ok(self)
    }
}

/// Pillar with a sweeping arm
#[derive(Debug, Clone)]
pub struct RotatingPillar {
    config: RotatingPillarConfig,
    arm_yaw: f32,
}

impl RotatingPillar {
    /// Create a pillar with the arm along the root's forward axis
    pub fn new(config: RotatingPillarConfig) -> Self {
        Self { config, arm_yaw: 0.0 }
    }

    /// Tunables
    pub fn config(&self) -> &RotatingPillarConfig {
        &self.config
    }

    /// Arm yaw relative to the root, degrees in `[0, 360)`
    pub fn arm_yaw(&self) -> f32 {
        self.arm_yaw
    }

    fn direction(&self) -> f32 {
        if self.config.clockwise {
            -1.0
        } else {
            1.0
        }
    }
}

impl Behavior for RotatingPillar {
    fn kind(&self) -> ObstacleKind {
        ObstacleKind::RotatingPillar
    }

    fn trigger(&self) -> Option<TriggerComponent> {
        let half_extents = Vec3::new(self.config.arm_length * 0.5, ARM_HALF_THICKNESS, ARM_HALF_THICKNESS);
        Some(
            TriggerComponent::new(TriggerVolume::from_half_extents(half_extents))
                .with_filter(TriggerFilter::pawns_only()),
        )
    }

    fn trigger_pose(&self, root: &Transform) -> Option<Transform> {
        let hub = Transform::from_translation(Vec3::new(0.0, 0.0, self.config.pillar_height))
            .with_rotation(yaw_rotation(self.arm_yaw));
        let arm = hub.mul_transform(Transform::from_translation(Vec3::new(
            self.config.arm_length * 0.5,
            0.0,
            0.0,
        )));
        Some(root.mul_transform(arm))
    }

    fn tick(&mut self, dt: f32, _cx: &mut BehaviorContext<'_>) {
        let delta = self.config.rotation_speed * self.direction() * dt;
        self.arm_yaw = (self.arm_yaw + delta).rem_euclid(360.0);
    }

    fn on_enter(&mut self, other: EntityId, cx: &mut BehaviorContext<'_>) {
        let base = cx.transform().translation;
        let Some(pawn) = cx.pawns.pawn_mut(other) else {
            return;
        };
        let knockback = knockback_velocity(base, pawn.position(), self.config.knockback_force);
        pawn.launch(knockback, true, true);
        log::debug!("pillar {} hit {}", cx.id, other);
    }
}
