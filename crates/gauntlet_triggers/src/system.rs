//! Trigger system for processing overlaps

use crate::events::TriggerEvent;
use crate::trigger::TriggerComponent;
use gauntlet_core::{EntityId, Transform};
use glam::Vec3;
use std::collections::{BTreeMap, HashSet};

/// A body that can set off triggers: a sphere, or an upright capsule when
/// `half_height` exceeds `radius`
#[derive(Debug, Clone)]
pub struct TriggerEntity {
    /// Entity ID
    pub id: EntityId,
    /// World position (capsule centre)
    pub position: Vec3,
    /// Bounding radius
    pub radius: f32,
    /// Capsule half-height including the hemispheres
    pub half_height: f32,
    /// Entity tags
    pub tags: HashSet<String>,
}

impl TriggerEntity {
    /// Create a new trigger entity
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            position: Vec3::ZERO,
            radius: 0.0,
            half_height: 0.0,
            tags: HashSet::new(),
        }
    }

    /// Set position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Treat the body as an upright capsule
    pub fn with_capsule(mut self, radius: f32, half_height: f32) -> Self {
        self.radius = radius;
        self.half_height = half_height;
        self
    }

    /// Centre of the sphere along the capsule axis closest to `target`
    pub fn closest_sphere_center(&self, target: Vec3) -> Vec3 {
        let reach = (self.half_height - self.radius).max(0.0);
        let z = target.z.clamp(self.position.z - reach, self.position.z + reach);
        Vec3::new(self.position.x, self.position.y, z)
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }
}

/// Where a trigger sits this frame. `None` means its collision is off.
#[derive(Debug, Clone, Copy)]
pub struct TriggerPose {
    /// Trigger entity
    pub id: EntityId,
    /// World transform, or `None` when disabled
    pub transform: Option<Transform>,
}

impl TriggerPose {
    /// Enabled trigger at a transform
    pub fn active(id: EntityId, transform: Transform) -> Self {
        Self {
            id,
            transform: Some(transform),
        }
    }

    /// Disabled trigger
    pub fn inactive(id: EntityId) -> Self {
        Self { id, transform: None }
    }
}

/// The trigger system that processes all triggers
#[derive(Debug, Default)]
pub struct TriggerSystem {
    triggers: BTreeMap<EntityId, TriggerComponent>,
    last_events: Vec<TriggerEvent>,
}

impl TriggerSystem {
    /// Create a new trigger system
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a trigger
    pub fn register_trigger(&mut self, entity_id: EntityId, trigger: TriggerComponent) {
        self.triggers.insert(entity_id, trigger);
    }

    /// Unregister a trigger
    pub fn unregister_trigger(&mut self, entity_id: EntityId) -> Option<TriggerComponent> {
        self.triggers.remove(&entity_id)
    }

    /// Get a trigger
    pub fn get_trigger(&self, entity_id: EntityId) -> Option<&TriggerComponent> {
        self.triggers.get(&entity_id)
    }

    /// Drop a destroyed body from every trigger, emitting its exits
    pub fn forget_entity(&mut self, entity_id: EntityId) {
        for (&trigger_id, trigger) in self.triggers.iter_mut() {
            trigger.forget(trigger_id, entity_id);
            self.last_events.extend(trigger.drain_events());
        }
    }

    /// Update the trigger system
    ///
    /// # Arguments
    /// * `poses` - Where each trigger sits this frame (or that it is off)
    /// * `others` - Bodies that can set triggers off
    ///
    /// Events accumulate until [`TriggerSystem::drain_events`]. Triggers are
    /// processed in pose order, bodies in slice order.
    pub fn update(&mut self, poses: &[TriggerPose], others: &[TriggerEntity]) {
        for pose in poses {
            let Some(trigger) = self.triggers.get_mut(&pose.id) else {
                continue;
            };

            let Some(transform) = pose.transform else {
                trigger.set_enabled(false);
                continue;
            };
            trigger.set_enabled(true);

            for entity in others {
                if entity.id == pose.id {
                    continue;
                }

                let center = entity.closest_sphere_center(transform.translation);
                let is_overlapping =
                    trigger
                        .volume
                        .intersects_sphere_at(&transform, center, entity.radius);

                trigger.process_overlap(pose.id, entity.id, is_overlapping, &entity.tags);
            }

            // Bodies that vanished without leaving
            let vanished: Vec<EntityId> = trigger
                .overlapping()
                .filter(|id| !others.iter().any(|e| e.id == *id))
                .collect();
            for id in vanished {
                trigger.forget(pose.id, id);
            }

            self.last_events.extend(trigger.drain_events());
        }
    }

    /// Drain collected events
    pub fn drain_events(&mut self) -> Vec<TriggerEvent> {
        std::mem::take(&mut self.last_events)
    }

    /// Get all trigger entity IDs
    pub fn trigger_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.triggers.keys().copied()
    }
}
