//! Conveyor belt
//!
//! Carries every body standing on it along the belt's forward axis (or
//! backwards) at a fixed speed. The tracked set is pruned of bodies that
//! vanished without an exit.

use crate::behavior::{Behavior, BehaviorContext, ObstacleKind, Surface};
use gauntlet_core::config::{at_least, finite_vec, Validate};
use gauntlet_core::error::Result;
use gauntlet_core::id::EntityId;
use gauntlet_core::scene::Transform;
use gauntlet_triggers::{TriggerComponent, TriggerFilter, TriggerVolume};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Conveyor belt tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConveyorBeltConfig {
    /// Carry speed
    pub belt_speed: f32,
    /// Carry along -forward
    pub reverse_direction: bool,
    /// Texture scroll speed of the belt surface
    pub uv_scroll_speed: f32,
    /// Belt half-extents
    pub half_extents: Vec3,
    /// Half-height of the detection box above the belt
    pub trigger_height: f32,
}

impl Default for ConveyorBeltConfig {
    fn default() -> Self {
        Self {
            belt_speed: 300.0,
            reverse_direction: false,
            uv_scroll_speed: 0.5,
            half_extents: Vec3::new(150.0, 75.0, 10.0),
            trigger_height: 30.0,
        }
    }
}

impl ConveyorBeltConfig {
    /// Run the belt backwards
    pub fn reversed(mut self) -> Self {
        self.reverse_direction = true;
        self
    }

    fn sign(&self) -> f32 {
        if self.reverse_direction {
            -1.0
        } else {
            1.0
        }
    }
}

impl Validate for ConveyorBeltConfig {
    fn validated(mut self) -> Result<Self> {
        self.belt_speed = at_least("belt_speed", self.belt_speed, 0.0)?;
        self.uv_scroll_speed = at_least("uv_scroll_speed", self.uv_scroll_speed, 0.0)?;
        self.half_extents = finite_vec("half_extents", self.half_extents)?.abs();
        self.trigger_height = at_least("trigger_height", self.trigger_height, 1.0)?;
        Ok(self)
    }
}

/// Belt moving bodies along
#[derive(Debug, Clone)]
pub struct ConveyorBelt {
    config: ConveyorBeltConfig,
    riders: Vec<EntityId>,
    scroll_speed: f32,
}

impl ConveyorBelt {
    /// Create a belt
    pub fn new(config: ConveyorBeltConfig) -> Self {
        Self {
            config,
            riders: Vec::new(),
            scroll_speed: 0.0,
        }
    }

    /// Tunables
    pub fn config(&self) -> &ConveyorBeltConfig {
        &self.config
    }

    /// Bodies currently carried
    pub fn riders(&self) -> &[EntityId] {
        &self.riders
    }

    /// Surface texture scroll speed, signed by direction. Set at play start.
    pub fn surface_scroll_speed(&self) -> f32 {
        self.scroll_speed
    }

    /// World displacement per second for a belt at `root`
    pub fn belt_velocity(&self, root: &Transform) -> Vec3 {
        root.forward() * self.config.sign() * self.config.belt_speed
    }
}

impl Behavior for ConveyorBelt {
    fn kind(&self) -> ObstacleKind {
        ObstacleKind::ConveyorBelt
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

    fn begin_play(&mut self, _cx: &mut BehaviorContext<'_>) {
        self.scroll_speed = self.config.uv_scroll_speed * self.config.sign();
    }

    fn tick(&mut self, dt: f32, cx: &mut BehaviorContext<'_>) {
        if self.riders.is_empty() {
            return;
        }
        let displacement = self.belt_velocity(&cx.transform()) * dt;
        let mut index = self.riders.len();
        while index > 0 {
            index -= 1;
            match cx.pawns.pawn_mut(self.riders[index]) {
                Some(pawn) => pawn.add_world_offset(displacement),
                None => {
                    log::debug!("conveyor {} dropped stale rider {}", cx.id, self.riders[index]);
                    self.riders.swap_remove(index);
                }
            }
        }
    }

    fn on_enter(&mut self, other: EntityId, cx: &mut BehaviorContext<'_>) {
        if !cx.pawns.contains(other) {
            return;
        }
        if !self.riders.contains(&other) {
            self.riders.push(other);
        }
    }

    fn on_exit(&mut self, other: EntityId, _cx: &mut BehaviorContext<'_>) {
        if let Some(index) = self.riders.iter().position(|id| *id == other) {
            self.riders.swap_remove(index);
        }
    }

    fn on_entity_destroyed(&mut self, entity: EntityId) {
        self.riders.retain(|id| *id != entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Harness, TestPawn};
    use approx::assert_relative_eq;
    use gauntlet_core::math::yaw_rotation;

    fn setup(config: ConveyorBeltConfig, root: Transform) -> (Harness, EntityId, EntityId, ConveyorBelt) {
        let mut harness = Harness::new();
        let id = EntityId::new(1, 0);
        let player = EntityId::new(2, 0);
        harness.place(id, root);
        harness.pawns.add(TestPawn::player(player, Vec3::new(0.0, 0.0, 116.0)));
        let mut belt = ConveyorBelt::new(config);
        harness.begin(id, &mut belt);
        (harness, id, player, belt)
    }

    #[test]
    fn test_displacement_is_n_speed_dt() {
        let (mut harness, id, player, mut belt) = setup(ConveyorBeltConfig::default(), Transform::IDENTITY);
        belt.on_enter(player, &mut harness.cx(id));

        let dt = 1.0 / 64.0;
        for _ in 0..40 {
            harness.step(id, &mut belt, dt);
        }
        let position = harness.pawns.get(player).position;
        assert_relative_eq!(position.x, 40.0 * 300.0 * dt, epsilon = 1e-3);
        assert_relative_eq!(position.y, 0.0);

        belt.on_exit(player, &mut harness.cx(id));
        harness.step(id, &mut belt, dt);
        assert_eq!(harness.pawns.get(player).position, position);
    }

    #[test]
    fn test_reverse_follows_belt_axis() {
        let root = Transform::IDENTITY.with_rotation(yaw_rotation(90.0));
        let (mut harness, id, player, mut belt) = setup(ConveyorBeltConfig::default().reversed(), root);
        assert_relative_eq!(belt.surface_scroll_speed(), -0.5);

        belt.on_enter(player, &mut harness.cx(id));
        belt.on_enter(player, &mut harness.cx(id));
        assert_eq!(belt.riders().len(), 1);

        for _ in 0..10 {
            harness.step(id, &mut belt, 0.1);
        }
        let position = harness.pawns.get(player).position;
        assert_relative_eq!(position.y, -300.0, epsilon = 1e-2);
        assert_relative_eq!(position.x, 0.0, epsilon = 1e-2);
    }

    #[test]
    fn test_prunes_vanished_riders() {
        let (mut harness, id, player, mut belt) = setup(ConveyorBeltConfig::default(), Transform::IDENTITY);
        let other = EntityId::new(3, 0);
        harness.pawns.add(TestPawn::npc(other, Vec3::ZERO));
        belt.on_enter(player, &mut harness.cx(id));
        belt.on_enter(other, &mut harness.cx(id));

        harness.pawns.remove(player);
        harness.step(id, &mut belt, 0.1);
        assert_eq!(belt.riders(), &[other]);
        assert_relative_eq!(harness.pawns.get(other).position.x, 30.0, epsilon = 1e-3);

        belt.on_entity_destroyed(other);
        assert!(belt.riders().is_empty());
    }
}
