//! Moving platform
//!
//! Bounces between `-move_distance` and `+move_distance` along one world
//! axis. Position is a pure function of elapsed time, so the motion is
//! periodic with period `4 * move_distance / move_speed`.

use crate::behavior::{Behavior, BehaviorContext, ObstacleKind, Surface};
use gauntlet_core::config::{at_least, finite_vec, Validate};
use gauntlet_core::error::Result;
use gauntlet_core::id::EntityId;
use gauntlet_core::math::triangle_wave;
use gauntlet_core::scene::Transform;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Moving platform tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovingPlatformConfig {
    /// Move along world Y; X otherwise
    pub move_left_right: bool,
    /// Amplitude either side of the start
    pub move_distance: f32,
    /// Units per second
    pub move_speed: f32,
    /// Deck half-extents
    pub half_extents: Vec3,
}

impl Default for MovingPlatformConfig {
    fn default() -> Self {
        Self {
            move_left_right: true,
            move_distance: 300.0,
            move_speed: 200.0,
            half_extents: Vec3::new(150.0, 150.0, 10.0),
        }
    }
}

impl MovingPlatformConfig {
    /// Set amplitude and speed
    pub fn with_motion(mut self, distance: f32, speed: f32) -> Self {
        self.move_distance = distance;
        self.move_speed = speed;
        self
    }

    /// Move along world X instead of Y
    pub fn forward_back(mut self) -> Self {
        self.move_left_right = false;
        self
    }

    /// Full cycle length in seconds, `None` when the platform is static
    pub fn period(&self) -> Option<f32> {
        if self.move_distance > 0.0 && self.move_speed > 0.0 {
            Some(4.0 * self.move_distance / self.move_speed)
        } else {
            None
        }
    }

    fn axis(&self) -> Vec3 {
        if self.move_left_right {
            Vec3::Y
        } else {
            Vec3::X
        }
    }
}

impl Validate for MovingPlatformConfig {
    fn validated(mut self) -> Result<Self> {
        self.move_distance = at_least("move_distance", self.move_distance, 0.0)?;
        self.move_speed = at_least("move_speed", self.move_speed, 0.0)?;
        self.half_extents = finite_vec("half_extents", self.half_extents)?.abs();
        Ok(self)
    }
}

/// Platform bouncing along one axis
#[derive(Debug, Clone)]
pub struct MovingPlatform {
    config: MovingPlatformConfig,
    start: Vec3,
    elapsed: f32,
}

impl MovingPlatform {
    /// Create a platform
    pub fn new(config: MovingPlatformConfig) -> Self {
        Self {
            config,
            start: Vec3::ZERO,
            elapsed: 0.0,
        }
    }

    /// Tunables
    pub fn config(&self) -> &MovingPlatformConfig {
        &self.config
    }

    /// Offset from the start position after `elapsed` seconds
    pub fn offset_at(&self, elapsed: f32) -> Vec3 {
        self.config.axis() * triangle_wave(elapsed, self.config.move_distance, self.config.move_speed)
    }

    /// Seconds since play began
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

impl Behavior for MovingPlatform {
    fn kind(&self) -> ObstacleKind {
        ObstacleKind::MovingPlatform
    }

    fn surface(&self, id: EntityId, root: &Transform) -> Option<Surface> {
        Some(Surface::deck(id, root, self.config.half_extents))
    }

    fn begin_play(&mut self, cx: &mut BehaviorContext<'_>) {
        self.start = cx.transform().translation;
        self.elapsed = 0.0;
    }

    fn tick(&mut self, dt: f32, cx: &mut BehaviorContext<'_>) {
        if self.config.period().is_none() {
            return;
        }
        self.elapsed += dt;
        let mut transform = cx.transform();
        transform.translation = self.start + self.offset_at(self.elapsed);
        cx.set_transform(transform);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use approx::assert_relative_eq;

    fn setup(config: MovingPlatformConfig) -> (Harness, EntityId, MovingPlatform) {
        let mut harness = Harness::new();
        let id = EntityId::new(1, 0);
        harness.place(id, Transform::from_translation(Vec3::new(500.0, 0.0, 0.0)));
        let mut platform = MovingPlatform::new(config);
        harness.begin(id, &mut platform);
        (harness, id, platform)
    }

    #[test]
    fn test_reverses_exactly_at_extremes() {
        let (mut harness, id, mut platform) = setup(MovingPlatformConfig::default());
        let dt = 0.25;

        // 300 units at 200/s: the far end is reached at 1.5 s
        for _ in 0..6 {
            harness.step(id, &mut platform, dt);
        }
        assert_relative_eq!(harness.transform(id).translation.y, 300.0);

        harness.step(id, &mut platform, dt);
        assert_relative_eq!(harness.transform(id).translation.y, 250.0);

        for _ in 0..11 {
            harness.step(id, &mut platform, dt);
        }
        assert_relative_eq!(harness.transform(id).translation.y, -300.0);
        assert_relative_eq!(harness.transform(id).translation.x, 500.0);
    }

    #[test]
    fn test_position_is_periodic() {
        let (mut harness, id, mut platform) = setup(MovingPlatformConfig::default());
        let period = platform.config().period().unwrap();
        assert_relative_eq!(period, 6.0);

        let dt = 0.25;
        let steps_per_period = (period / dt) as usize;
        let mut first_cycle = Vec::new();
        for _ in 0..steps_per_period {
            harness.step(id, &mut platform, dt);
            first_cycle.push(harness.transform(id).translation);
        }
        for cycle in 0..3 {
            for (step, expected) in first_cycle.iter().enumerate() {
                harness.step(id, &mut platform, dt);
                assert_eq!(
                    harness.transform(id).translation,
                    *expected,
                    "cycle {} step {}",
                    cycle,
                    step
                );
            }
        }
    }

    #[test]
    fn test_forward_axis_and_static_platform() {
        let config = MovingPlatformConfig::default().forward_back().with_motion(100.0, 100.0);
        let (mut harness, id, mut platform) = setup(config);
        harness.step(id, &mut platform, 0.5);
        assert_relative_eq!(harness.transform(id).translation.x, 550.0);
        assert_relative_eq!(harness.transform(id).translation.y, 0.0);

        let (mut harness, id, mut platform) = setup(MovingPlatformConfig::default().with_motion(0.0, 200.0));
        harness.step(id, &mut platform, 0.5);
        assert_eq!(harness.transform(id).translation, Vec3::new(500.0, 0.0, 0.0));
    }
}
