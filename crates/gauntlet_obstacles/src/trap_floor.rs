//! Trap floor
//!
//! A tile that drops out from under the first body to step on it. After
//! `fall_delay` seconds its collision turns off and it falls under gravity;
//! once it has dropped past `fall_threshold` it is gone. With a
//! `respawn_delay` it comes back armed at its original pose, otherwise the
//! entity is destroyed.

use crate::behavior::{Behavior, BehaviorContext, BehaviorTimer, ObstacleKind, Surface};
use gauntlet_core::config::{at_least, finite_vec, Validate};
use gauntlet_core::error::Result;
use gauntlet_core::id::EntityId;
use gauntlet_core::scene::Transform;
use gauntlet_triggers::{TriggerComponent, TriggerFilter, TriggerVolume};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Trap floor tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrapFloorConfig {
    /// Seconds between the first step and the drop
    pub fall_delay: f32,
    /// Seconds the tile stays gone; `None` destroys it
    pub respawn_delay: Option<f32>,
    /// Drop distance at which the tile is removed
    pub fall_threshold: f32,
    /// Fall acceleration
    pub gravity: f32,
    /// Tile half-extents
    pub half_extents: Vec3,
    /// Half-height of the detection box above the tile
    pub trigger_height: f32,
}

impl Default for TrapFloorConfig {
    fn default() -> Self {
        Self {
            fall_delay: 1.5,
            respawn_delay: Some(3.0),
            fall_threshold: 1000.0,
            gravity: 980.0,
            half_extents: Vec3::new(150.0, 150.0, 10.0),
            trigger_height: 30.0,
        }
    }
}

impl TrapFloorConfig {
    /// Destroy the tile after its fall instead of bringing it back
    pub fn single_use(mut self) -> Self {
        self.respawn_delay = None;
        self
    }
}

impl Validate for TrapFloorConfig {
    fn validated(mut self) -> Result<Self> {
        self.fall_delay = at_least("fall_delay", self.fall_delay, 0.0)?;
        if let Some(delay) = self.respawn_delay {
            self.respawn_delay = Some(at_least("respawn_delay", delay, 0.0)?);
        }
        self.fall_threshold = at_least("fall_threshold", self.fall_threshold, 0.0)?;
        self.gravity = at_least("gravity", self.gravity, 1.0)?;
        self.half_extents = finite_vec("half_extents", self.half_extents)?.abs();
        self.trigger_height = at_least("trigger_height", self.trigger_height, 1.0)?;
        Ok(self)
    }
}

/// Where the tile is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TrapFloorState {
    /// Waiting for a body
    Armed,
    /// Stepped on; the fall timer is running
    Primed,
    /// Collision off, dropping
    Falling {
        /// Current fall speed
        speed: f32,
        /// Distance dropped so far
        distance: f32,
    },
    /// Out of play until respawn or destruction
    Removed,
}

/// Floor tile that gives way
#[derive(Debug, Clone)]
pub struct TrapFloor {
    config: TrapFloorConfig,
    state: TrapFloorState,
    home: Transform,
    triggered_by: Option<EntityId>,
}

impl TrapFloor {
    /// Create an armed tile
    pub fn new(config: TrapFloorConfig) -> Self {
        Self {
            config,
            state: TrapFloorState::Armed,
            home: Transform::IDENTITY,
            triggered_by: None,
        }
    }

    /// Tunables
    pub fn config(&self) -> &TrapFloorConfig {
        &self.config
    }

    /// Current state
    pub fn state(&self) -> TrapFloorState {
        self.state
    }

    /// Whether bodies collide with the tile
    pub fn is_collision_enabled(&self) -> bool {
        matches!(self.state, TrapFloorState::Armed | TrapFloorState::Primed)
    }

    /// Body that set the trap off
    pub fn triggered_by(&self) -> Option<EntityId> {
        self.triggered_by
    }

    fn start_falling(&mut self, cx: &mut BehaviorContext<'_>) {
        self.state = TrapFloorState::Falling {
            speed: 0.0,
            distance: 0.0,
        };
        log::info!("trap floor {} falling", cx.id);
    }

    fn remove(&mut self, cx: &mut BehaviorContext<'_>) {
        self.state = TrapFloorState::Removed;
        match self.config.respawn_delay {
            Some(delay) => {
                log::debug!("trap floor {} gone, back in {}s", cx.id, delay);
                cx.schedule_once(delay, BehaviorTimer::Respawn);
            }
            None => {
                log::debug!("trap floor {} destroyed", cx.id);
                cx.destroy_self();
            }
        }
    }

    fn respawn(&mut self, cx: &mut BehaviorContext<'_>) {
        if self.state != TrapFloorState::Removed {
            return;
        }
        cx.set_transform(self.home);
        self.state = TrapFloorState::Armed;
        self.triggered_by = None;
        log::debug!("trap floor {} re-armed", cx.id);
    }
}

impl Behavior for TrapFloor {
    fn kind(&self) -> ObstacleKind {
        ObstacleKind::TrapFloor
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
        if !self.is_collision_enabled() {
            return None;
        }
        let lift = self.config.half_extents.z + self.config.trigger_height;
        Some(root.mul_transform(Transform::from_translation(Vec3::new(0.0, 0.0, lift))))
    }

    fn surface(&self, id: EntityId, root: &Transform) -> Option<Surface> {
        self.is_collision_enabled()
            .then(|| Surface::deck(id, root, self.config.half_extents))
    }

    fn begin_play(&mut self, cx: &mut BehaviorContext<'_>) {
        self.home = cx.transform();
    }

    fn tick(&mut self, dt: f32, cx: &mut BehaviorContext<'_>) {
        let TrapFloorState::Falling { speed, distance } = self.state else {
            return;
        };
        let speed = speed + self.config.gravity * dt;
        let drop = speed * dt;
        let mut transform = cx.transform();
        transform.translation.z -= drop;
        cx.set_transform(transform);

        let distance = distance + drop;
        self.state = TrapFloorState::Falling { speed, distance };
        if distance > self.config.fall_threshold {
            self.remove(cx);
        }
    }

    fn on_enter(&mut self, other: EntityId, cx: &mut BehaviorContext<'_>) {
        if self.state != TrapFloorState::Armed {
            return;
        }
        if !cx.pawns.contains(other) {
            return;
        }
        self.state = TrapFloorState::Primed;
        self.triggered_by = Some(other);
        cx.schedule_once(self.config.fall_delay, BehaviorTimer::FallDelay);
        log::debug!("trap floor {} primed by {}", cx.id, other);
    }

    fn on_timer(&mut self, timer: BehaviorTimer, cx: &mut BehaviorContext<'_>) {
        match timer {
            BehaviorTimer::FallDelay if self.state == TrapFloorState::Primed => self.start_falling(cx),
            BehaviorTimer::Respawn => self.respawn(cx),
            _ => {}
        }
    }
}
