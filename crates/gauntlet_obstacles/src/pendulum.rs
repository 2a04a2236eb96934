//! Swinging pendulum
//!
//! The arm hangs from the root and swings about the root's local Y axis.
//! Its angle is `swing_angle * sin(t * swing_speed)`, so any elapsed time
//! gives the same pose regardless of how the frames were sliced.

use crate::behavior::{Behavior, BehaviorContext, ObstacleKind};
use gauntlet_core::config::{at_least, clamped, Validate};
use gauntlet_core::error::Result;
use gauntlet_core::id::EntityId;
use gauntlet_core::math::{knockback_velocity, pitch_rotation};
use gauntlet_core::scene::Transform;
use gauntlet_triggers::{TriggerComponent, TriggerFilter, TriggerVolume};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Pendulum tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendulumConfig {
    /// Peak swing either side of vertical, degrees
    pub swing_angle: f32,
    /// Angular frequency of the swing (rad/s)
    pub swing_speed: f32,
    /// Knockback speed on hit
    pub push_force: f32,
    /// Pivot to head distance
    pub arm_length: f32,
    /// Hit sphere around the head
    pub head_radius: f32,
}

impl Default for PendulumConfig {
    fn default() -> Self {
        Self {
            swing_angle: 45.0,
            swing_speed: 1.5,
            push_force: 1500.0,
            arm_length: 300.0,
            head_radius: 100.0,
        }
    }
}

impl Validate for PendulumConfig {
    fn validated(mut self) -> Result<Self> {
        self.swing_angle = clamped("swing_angle", self.swing_angle, 1.0, 90.0)?;
        self.swing_speed = at_least("swing_speed", self.swing_speed, 0.1)?;
        self.push_force = at_least("push_force", self.push_force, 0.0)?;
        self.arm_length = at_least("arm_length", self.arm_length, 50.0)?;
        self.head_radius = at_least("head_radius", self.head_radius, 1.0)?;
        Ok(self)
    }
}

/// Pendulum that bats bodies away
#[derive(Debug, Clone)]
pub struct Pendulum {
    config: PendulumConfig,
    elapsed: f32,
}

impl Pendulum {
    /// Create a pendulum at rest in the middle of its swing
    pub fn new(config: PendulumConfig) -> Self {
        Self { config, elapsed: 0.0 }
    }

    /// Start from an arbitrary point of the swing
    pub fn with_elapsed(mut self, elapsed: f32) -> Self {
        self.elapsed = elapsed;
        self
    }

    /// Tunables
    pub fn config(&self) -> &PendulumConfig {
        &self.config
    }

    /// Swing angle in degrees after `elapsed` seconds
    pub fn angle_at(&self, elapsed: f32) -> f32 {
        self.config.swing_angle * (elapsed * self.config.swing_speed).sin()
    }

    /// Current swing angle in degrees
    pub fn angle(&self) -> f32 {
        self.angle_at(self.elapsed)
    }

    /// World position of the head
    pub fn head_position(&self, root: &Transform) -> Vec3 {
        let arm = pitch_rotation(self.angle()) * Vec3::new(0.0, 0.0, -self.config.arm_length);
        root.transform_point(arm)
    }
}

impl Behavior for Pendulum {
    fn kind(&self) -> ObstacleKind {
        ObstacleKind::Pendulum
    }

    fn trigger(&self) -> Option<TriggerComponent> {
        Some(
            TriggerComponent::new(TriggerVolume::sphere(self.config.head_radius))
                .with_filter(TriggerFilter::pawns_only()),
        )
    }

    fn trigger_pose(&self, root: &Transform) -> Option<Transform> {
        Some(Transform::from_translation(self.head_position(root)))
    }

    fn tick(&mut self, dt: f32, _cx: &mut BehaviorContext<'_>) {
        self.elapsed += dt;
    }

    fn on_enter(&mut self, other: EntityId, cx: &mut BehaviorContext<'_>) {
        let head = self.head_position(&cx.transform());
        let Some(pawn) = cx.pawns.pawn_mut(other) else {
            return;
        };
        let push = knockback_velocity(head, pawn.position(), self.config.push_force);
        pawn.launch(push, true, true);
        log::debug!("pendulum {} hit {}", cx.id, other);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Harness, TestPawn};
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    #[test]
    fn test_swing_is_restartable() {
        let config = PendulumConfig::default();
        let quarter = PI / 2.0 / config.swing_speed;

        let mut stepped = Pendulum::new(config.clone());
        let mut harness = Harness::new();
        let id = EntityId::new(1, 0);
        for _ in 0..100 {
            harness.step(id, &mut stepped, quarter / 100.0);
        }
        assert_relative_eq!(stepped.angle(), 45.0, epsilon = 1e-3);

        let jumped = Pendulum::new(config).with_elapsed(quarter);
        assert_relative_eq!(jumped.angle(), 45.0, epsilon = 1e-4);
    }

    #[test]
    fn test_head_follows_the_arm() {
        let root = Transform::from_translation(Vec3::new(0.0, 0.0, 500.0));
        let pendulum = Pendulum::new(PendulumConfig::default());
        assert_relative_eq!(pendulum.head_position(&root).z, 200.0);

        let quarter = PI / 2.0 / 1.5;
        let swung = Pendulum::new(PendulumConfig::default()).with_elapsed(quarter);
        let head = swung.head_position(&root);
        let expected = 300.0 * 45f32.to_radians().sin();
        assert_relative_eq!(head.x, expected, epsilon = 1e-2);
        assert_relative_eq!(head.z, 500.0 - expected, epsilon = 1e-2);
    }

    #[test]
    fn test_hit_pushes_out_and_up() {
        let mut harness = Harness::new();
        let id = EntityId::new(1, 0);
        let player = EntityId::new(2, 0);
        harness.place(id, Transform::from_translation(Vec3::new(0.0, 0.0, 400.0)));
        harness.pawns.add(TestPawn::player(player, Vec3::new(0.0, 80.0, 96.0)));

        let mut pendulum = Pendulum::new(PendulumConfig::default());
        pendulum.on_enter(player, &mut harness.cx(id));

        let velocity = harness.pawns.get(player).velocity;
        assert_relative_eq!(velocity.length(), 1500.0, epsilon = 1e-2);
        assert!(velocity.y > 0.0);
        assert!(velocity.z > 0.0);
        assert_relative_eq!(velocity.x, 0.0, epsilon = 1e-3);
        assert!(harness.pawns.get(player).launches[0].1);
    }

    #[test]
    fn test_non_pawn_is_ignored() {
        let mut harness = Harness::new();
        let id = EntityId::new(1, 0);
        let mut pendulum = Pendulum::new(PendulumConfig::default());
        pendulum.on_enter(EntityId::new(9, 0), &mut harness.cx(id));
        assert!(harness.commands.is_empty());
    }

    #[test]
    fn test_config_clamps() {
        let config = PendulumConfig {
            swing_angle: 120.0,
            arm_length: 10.0,
            ..Default::default()
        }
        .validated()
        .unwrap();
        assert_eq!(config.swing_angle, 90.0);
        assert_eq!(config.arm_length, 50.0);
    }
}
