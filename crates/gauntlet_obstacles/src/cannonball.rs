//! Cannonball
//!
//! A ballistic projectile. It ignores the cannon that fired it, knocks back
//! the first pawn it touches and disappears on any other contact or when its
//! lifespan runs out.

use crate::behavior::{Behavior, BehaviorContext, BehaviorTimer, ObstacleKind};
use gauntlet_core::config::{at_least, Validate};
use gauntlet_core::error::Result;
use gauntlet_core::id::EntityId;
use gauntlet_core::math::knockback_velocity;
use gauntlet_core::scene::Transform;
use gauntlet_triggers::{TriggerComponent, TriggerFilter, TriggerVolume};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Cannonball tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CannonballConfig {
    /// Collision radius
    pub radius: f32,
    /// Downward acceleration
    pub gravity: f32,
    /// Seconds before the ball removes itself
    pub lifespan: f32,
    /// Knockback speed on a pawn hit
    pub knockback_force: f32,
    /// Speed cap; `None` uses the launch speed
    pub max_speed: Option<f32>,
}

impl Default for CannonballConfig {
    fn default() -> Self {
        Self {
            radius: 20.0,
            gravity: 980.0,
            lifespan: 10.0,
            knockback_force: 1500.0,
            max_speed: None,
        }
    }
}

impl Validate for CannonballConfig {
    fn validated(mut self) -> Result<Self> {
        self.radius = at_least("radius", self.radius, 1.0)?;
        self.gravity = at_least("gravity", self.gravity, 0.0)?;
        self.lifespan = at_least("lifespan", self.lifespan, 0.1)?;
        self.knockback_force = at_least("knockback_force", self.knockback_force, 0.0)?;
        if let Some(max_speed) = self.max_speed {
            self.max_speed = Some(at_least("max_speed", max_speed, 0.0)?);
        }
        Ok(self)
    }
}

/// Projectile in flight
#[derive(Debug, Clone)]
pub struct Cannonball {
    config: CannonballConfig,
    owner: EntityId,
    velocity: Vec3,
    max_speed: f32,
    spent: bool,
    hit: Option<EntityId>,
}

impl Cannonball {
    /// Ball fired by `owner` with `velocity`
    pub fn new(owner: EntityId, velocity: Vec3, config: CannonballConfig) -> Self {
        let max_speed = config.max_speed.unwrap_or_else(|| velocity.length());
        Self {
            config,
            owner,
            velocity,
            max_speed,
            spent: false,
            hit: None,
        }
    }

    /// Tunables
    pub fn config(&self) -> &CannonballConfig {
        &self.config
    }

    /// Entity that fired the ball
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// Current velocity
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Collision radius
    pub fn radius(&self) -> f32 {
        self.config.radius
    }

    /// Whether the ball already asked to be removed
    pub fn is_spent(&self) -> bool {
        self.spent
    }

    /// Pawn the ball knocked back, if any
    pub fn hit(&self) -> Option<EntityId> {
        self.hit
    }

    fn expire(&mut self, cx: &mut BehaviorContext<'_>) {
        if self.spent {
            return;
        }
        self.spent = true;
        cx.destroy_self();
    }
}

impl Behavior for Cannonball {
    fn kind(&self) -> ObstacleKind {
        ObstacleKind::Cannonball
    }

    fn trigger(&self) -> Option<TriggerComponent> {
        Some(
            TriggerComponent::new(TriggerVolume::sphere(self.config.radius))
                .with_filter(TriggerFilter::pawns_only().block_entities([self.owner])),
        )
    }

    fn trigger_pose(&self, root: &Transform) -> Option<Transform> {
        (!self.spent).then_some(*root)
    }

    fn begin_play(&mut self, cx: &mut BehaviorContext<'_>) {
        cx.schedule_once(self.config.lifespan, BehaviorTimer::Lifespan);
    }

    fn tick(&mut self, dt: f32, cx: &mut BehaviorContext<'_>) {
        if self.spent {
            return;
        }
        self.velocity.z -= self.config.gravity * dt;
        self.velocity = self.velocity.clamp_length_max(self.max_speed);

        let mut transform = cx.transform();
        transform.translation += self.velocity * dt;
        if let Some(direction) = self.velocity.try_normalize() {
            transform.rotation = Quat::from_rotation_arc(Vec3::X, direction);
        }
        cx.set_transform(transform);
    }

    fn on_enter(&mut self, other: EntityId, cx: &mut BehaviorContext<'_>) {
        if self.spent || other == self.owner {
            return;
        }
        let origin = cx.transform().translation;
        let Some(pawn) = cx.pawns.pawn_mut(other) else {
            return;
        };
        let knockback = knockback_velocity(origin, pawn.position(), self.config.knockback_force);
        pawn.launch(knockback, true, true);
        self.hit = Some(other);
        log::info!("cannonball {} hit {}", cx.id, other);
        self.expire(cx);
    }

    fn on_contact(&mut self, other: Option<EntityId>, cx: &mut BehaviorContext<'_>) {
        if other == Some(self.owner) {
            return;
        }
        self.expire(cx);
    }

    fn on_timer(&mut self, timer: BehaviorTimer, cx: &mut BehaviorContext<'_>) {
        if timer == BehaviorTimer::Lifespan {
            log::trace!("cannonball {} expired", cx.id);
            self.expire(cx);
        }
    }
}
