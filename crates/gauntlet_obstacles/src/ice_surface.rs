//! Ice surface
//!
//! Swaps the friction and braking of any body on it for slippery values and
//! puts the originals back when it steps off. Originals are captured once per
//! body, so re-entering never caches the icy values.

use crate::behavior::{Behavior, BehaviorContext, ObstacleKind, Surface};
use gauntlet_core::config::{at_least, clamped, finite_vec, Validate};
use gauntlet_core::error::Result;
use gauntlet_core::id::EntityId;
use gauntlet_core::scene::Transform;
use gauntlet_triggers::{TriggerComponent, TriggerFilter, TriggerVolume};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ice surface tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IceSurfaceConfig {
    /// Ground friction while on the ice, `0..=8`
    pub friction: f32,
    /// Braking deceleration while on the ice
    pub braking_deceleration: f32,
    /// Slab half-extents
    pub half_extents: Vec3,
    /// Half-height of the detection box above the slab
    pub trigger_height: f32,
}

impl Default for IceSurfaceConfig {
    fn default() -> Self {
        Self {
            friction: 0.05,
            braking_deceleration: 100.0,
            half_extents: Vec3::new(500.0, 500.0, 10.0),
            trigger_height: 50.0,
        }
    }
}

impl Validate for IceSurfaceConfig {
    fn validated(mut self) -> Result<Self> {
        self.friction = clamped("friction", self.friction, 0.0, 8.0)?;
        self.braking_deceleration = at_least("braking_deceleration", self.braking_deceleration, 0.0)?;
        self.half_extents = finite_vec("half_extents", self.half_extents)?.abs();
        self.trigger_height = at_least("trigger_height", self.trigger_height, 1.0)?;
        Ok(self)
    }
}

/// Friction and braking a body had before stepping on
#[derive(Debug, Clone, Copy, PartialEq)]
struct Grip {
    friction: f32,
    braking_deceleration: f32,
}

/// Slippery slab
#[derive(Debug, Clone)]
pub struct IceSurface {
    config: IceSurfaceConfig,
    originals: HashMap<EntityId, Grip>,
}

impl IceSurface {
    /// Create a slab
    pub fn new(config: IceSurfaceConfig) -> Self {
        Self {
            config,
            originals: HashMap::new(),
        }
    }

    /// Tunables
    pub fn config(&self) -> &IceSurfaceConfig {
        &self.config
    }

    /// Whether the slab holds originals for `entity`
    pub fn is_tracking(&self, entity: EntityId) -> bool {
        self.originals.contains_key(&entity)
    }

    /// Bodies whose originals are held
    pub fn tracked_count(&self) -> usize {
        self.originals.len()
    }
}

impl Behavior for IceSurface {
    fn kind(&self) -> ObstacleKind {
        ObstacleKind::IceSurface
    }

    fn trigger(&self) -> Option<TriggerComponent> {
        let half_extents = Vec3::new(
            self.config.half_extents.x,
            self.config.half_extents.y,
            self.config.trigger_height,
        );
        Some(
            TriggerComponent::new(TriggerVolume::from_half_extents(half_extents))
                .with_filter(TriggerFilter::pawns_only()),
        )
    }

    fn trigger_pose(&self, root: &Transform) -> Option<Transform> {
        let lift = self.config.half_extents.z + self.config.trigger_height;
        Some(root.mul_transform(Transform::from_translation(Vec3::new(0.0, 0.0, lift))))
    }

    fn surface(&self, id: EntityId, root: &Transform) -> Option<Surface> {
        Some(Surface::deck(id, root, self.config.half_extents))
    }

    /// Caches whatever grip the pawn has on entry. A pawn that slides onto
    /// the ice carries zero friction and braking, so those zeros are what
    /// `on_exit` puts back.
    fn on_enter(&mut self, other: EntityId, cx: &mut BehaviorContext<'_>) {
        let Some(pawn) = cx.pawns.pawn_mut(other) else {
            return;
        };
        let mut params = pawn.movement();
        self.originals.entry(other).or_insert(Grip {
            friction: params.ground_friction,
            braking_deceleration: params.braking_deceleration,
        });
        params.ground_friction = self.config.friction;
        params.braking_deceleration = self.config.braking_deceleration;
        pawn.set_movement(params);
        log::debug!("ice {} took grip from {}", cx.id, other);
    }

    fn on_exit(&mut self, other: EntityId, cx: &mut BehaviorContext<'_>) {
        let Some(grip) = self.originals.remove(&other) else {
            return;
        };
        let Some(pawn) = cx.pawns.pawn_mut(other) else {
            return;
        };
        let mut params = pawn.movement();
        params.ground_friction = grip.friction;
        params.braking_deceleration = grip.braking_deceleration;
        pawn.set_movement(params);
        log::debug!("ice {} gave grip back to {}", cx.id, other);
    }

    fn on_entity_destroyed(&mut self, entity: EntityId) {
        self.originals.remove(&entity);
    }
}
