//! Transforms owned apart from behavior

use crate::id::EntityId;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Position and orientation of an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// World translation
    pub translation: Vec3,
    /// World rotation
    pub rotation: Quat,
}

impl Transform {
    /// Identity transform
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Transform at a position with no rotation
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
        }
    }

    /// Set rotation
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Forward (+X) axis
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Right (+Y) axis
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Map a point from local to world space
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.translation + self.rotation * local
    }

    /// Child transform at a local offset and local rotation
    pub fn mul_transform(&self, local: Transform) -> Transform {
        Transform {
            translation: self.transform_point(local.translation),
            rotation: self.rotation * local.rotation,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Per-entity transform storage
#[derive(Debug, Default)]
pub struct SceneGraph {
    transforms: HashMap<EntityId, Transform>,
}

impl SceneGraph {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a transform
    pub fn insert(&mut self, id: EntityId, transform: Transform) {
        self.transforms.insert(id, transform);
    }

    /// Remove an entity's transform
    pub fn remove(&mut self, id: EntityId) -> Option<Transform> {
        self.transforms.remove(&id)
    }

    /// Get a transform
    pub fn get(&self, id: EntityId) -> Option<&Transform> {
        self.transforms.get(&id)
    }

    /// Get a mutable transform
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Transform> {
        self.transforms.get_mut(&id)
    }

    /// Offset an entity in world space
    pub fn translate(&mut self, id: EntityId, offset: Vec3) -> bool {
        match self.transforms.get_mut(&id) {
            Some(transform) => {
                transform.translation += offset;
                true
            }
            None => false,
        }
    }

    /// Number of transforms
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Whether the scene is empty
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}
