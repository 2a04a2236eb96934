//! Jump pad

use crate::behavior::{Behavior, BehaviorContext, ObstacleKind, Surface};
use gauntlet_core::config::{at_least, finite_vec, Validate};
use gauntlet_core::error::Result;
use gauntlet_core::id::EntityId;
use gauntlet_core::scene::Transform;
use gauntlet_triggers::{TriggerComponent, TriggerFilter, TriggerVolume};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Jump pad tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpPadConfig {
    /// Upward launch speed
    pub launch_force: f32,
    /// Replace vertical velocity instead of adding to it
    pub override_z_velocity: bool,
    /// Pad half-extents
    pub half_extents: Vec3,
    /// Half-height of the detection box above the pad
    pub trigger_height: f32,
}

impl Default for JumpPadConfig {
    fn default() -> Self {
        Self {
            launch_force: 1500.0,
            override_z_velocity: true,
            half_extents: Vec3::new(75.0, 75.0, 15.0),
            trigger_height: 30.0,
        }
    }
}

impl Validate for JumpPadConfig {
    fn validated(mut self) -> Result<Self> {
        self.launch_force = at_least("launch_force", self.launch_force, 0.0)?;
        self.half_extents = finite_vec("half_extents", self.half_extents)?.abs();
        self.trigger_height = at_least("trigger_height", self.trigger_height, 1.0)?;
        Ok(self)
    }
}

/// Pad that throws bodies straight up
#[derive(Debug, Clone)]
pub struct JumpPad {
    config: JumpPadConfig,
    launches: u32,
}

impl JumpPad {
    /// Create a pad
    pub fn new(config: JumpPadConfig) -> Self {
        Self { config, launches: 0 }
    }

    /// Tunables
    pub fn config(&self) -> &JumpPadConfig {
        &self.config
    }

    /// Bodies launched so far
    pub fn launches(&self) -> u32 {
        self.launches
    }
}

impl Behavior for JumpPad {
    fn kind(&self) -> ObstacleKind {
        ObstacleKind::JumpPad
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

    fn on_enter(&mut self, other: EntityId, cx: &mut BehaviorContext<'_>) {
        let Some(pawn) = cx.pawns.pawn_mut(other) else {
            return;
        };
        pawn.mark_jump_pad_launched();
        pawn.launch(
            Vec3::new(0.0, 0.0, self.config.launch_force),
            false,
            self.config.override_z_velocity,
        );
        self.launches += 1;
        log::debug!("jump pad {} launched {}", cx.id, other);
    }
}
