//! Cannon
//!
//! Fires a cannonball from its muzzle every `fire_interval` seconds. The
//! barrel points along the root's forward axis, raised by `barrel_angle`.

use crate::behavior::{Behavior, BehaviorContext, BehaviorTimer, ObstacleKind, SpawnRequest};
use crate::cannonball::CannonballConfig;
use gauntlet_core::config::{at_least, clamped, Validate};
use gauntlet_core::error::Result;
use gauntlet_core::math::pitch_rotation;
use gauntlet_core::scene::Transform;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Cannon tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CannonConfig {
    /// Barrel elevation in degrees, `-90..=90`
    pub barrel_angle: f32,
    /// Muzzle speed of each ball
    pub launch_speed: f32,
    /// Seconds between shots
    pub fire_interval: f32,
    /// Knockback speed of each ball
    pub knockback_force: f32,
    /// Pivot to muzzle distance
    pub barrel_length: f32,
    /// Barrel pivot height above the root
    pub pivot_height: f32,
}

impl Default for CannonConfig {
    fn default() -> Self {
        Self {
            barrel_angle: 45.0,
            launch_speed: 2000.0,
            fire_interval: 2.0,
            knockback_force: 1500.0,
            barrel_length: 200.0,
            pivot_height: 100.0,
        }
    }
}

impl Validate for CannonConfig {
    fn validated(mut self) -> Result<Self> {
        self.barrel_angle = clamped("barrel_angle", self.barrel_angle, -90.0, 90.0)?;
        self.launch_speed = at_least("launch_speed", self.launch_speed, 0.0)?;
        self.fire_interval = at_least("fire_interval", self.fire_interval, 0.1)?;
        self.knockback_force = at_least("knockback_force", self.knockback_force, 0.0)?;
        self.barrel_length = at_least("barrel_length", self.barrel_length, 50.0)?;
        self.pivot_height = at_least("pivot_height", self.pivot_height, 0.0)?;
        Ok(self)
    }
}

/// Turret lobbing cannonballs
#[derive(Debug, Clone)]
pub struct Cannon {
    config: CannonConfig,
    shots: u32,
}

impl Cannon {
    /// Create a cannon
    pub fn new(config: CannonConfig) -> Self {
        Self { config, shots: 0 }
    }

    /// Tunables
    pub fn config(&self) -> &CannonConfig {
        &self.config
    }

    /// Balls fired so far
    pub fn shots(&self) -> u32 {
        self.shots
    }

    /// Barrel pivot pose for a cannon at `root`
    fn pivot(&self, root: &Transform) -> Transform {
        let pivot = Transform::from_translation(Vec3::new(0.0, 0.0, self.config.pivot_height))
            .with_rotation(pitch_rotation(self.config.barrel_angle));
        root.mul_transform(pivot)
    }

    /// World direction the barrel points
    pub fn barrel_direction(&self, root: &Transform) -> Vec3 {
        self.pivot(root).forward()
    }

    /// Pose at the barrel's mouth
    pub fn muzzle_transform(&self, root: &Transform) -> Transform {
        let pivot = self.pivot(root);
        Transform::from_translation(pivot.translation + pivot.forward() * self.config.barrel_length)
            .with_rotation(pivot.rotation)
    }

    fn fire(&mut self, cx: &mut BehaviorContext<'_>) {
        let root = cx.transform();
        let velocity = self.barrel_direction(&root) * self.config.launch_speed;
        let ball = CannonballConfig {
            knockback_force: self.config.knockback_force,
            ..Default::default()
        };
        cx.spawn(SpawnRequest::Cannonball {
            owner: cx.id,
            transform: self.muzzle_transform(&root),
            velocity,
            config: ball,
        });
        self.shots += 1;
        log::trace!("cannon {} fired shot {}", cx.id, self.shots);
    }
}

impl Behavior for Cannon {
    fn kind(&self) -> ObstacleKind {
        ObstacleKind::Cannon
    }

    fn begin_play(&mut self, cx: &mut BehaviorContext<'_>) {
        cx.schedule_repeating(self.config.fire_interval, BehaviorTimer::Fire);
    }

    fn on_timer(&mut self, timer: BehaviorTimer, cx: &mut BehaviorContext<'_>) {
        if timer == BehaviorTimer::Fire {
            self.fire(cx);
        }
    }
}
