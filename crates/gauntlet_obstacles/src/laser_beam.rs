//! Laser beam
//!
//! A beam strung between two posts, on for the first half of every
//! `beam_cycle` and off for the second. Touching it while it is on kills.

use crate::behavior::{Behavior, BehaviorContext, BehaviorTimer, ObstacleKind};
use gauntlet_core::config::{at_least, Validate};
use gauntlet_core::error::Result;
use gauntlet_core::id::EntityId;
use gauntlet_core::scene::Transform;
use gauntlet_triggers::{TriggerComponent, TriggerFilter, TriggerVolume};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Half thickness of the beam's hit box
const BEAM_HALF_THICKNESS: f32 = 20.0;

/// Laser beam tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaserBeamConfig {
    /// Distance between the posts; the beam spans it along local Y
    pub pillar_distance: f32,
    /// Full on/off cycle in seconds
    pub beam_cycle: f32,
    /// Beam height above the root
    pub beam_height: f32,
}

impl Default for LaserBeamConfig {
    fn default() -> Self {
        Self {
            pillar_distance: 500.0,
            beam_cycle: 3.0,
            beam_height: 100.0,
        }
    }
}

impl Validate for LaserBeamConfig {
    fn validated(mut self) -> Result<Self> {
        self.pillar_distance = at_least("pillar_distance", self.pillar_distance, 100.0)?;
        self.beam_cycle = at_least("beam_cycle", self.beam_cycle, 0.2)?;
        self.beam_height = at_least("beam_height", self.beam_height, 0.0)?;
        Ok(self)
    }
}

/// Beam that blinks on and off
#[derive(Debug, Clone)]
pub struct LaserBeam {
    config: LaserBeamConfig,
    active: bool,
    kills: u32,
}

impl LaserBeam {
    /// Create a beam, switched on
    pub fn new(config: LaserBeamConfig) -> Self {
        Self {
            config,
            active: true,
            kills: 0,
        }
    }

    /// Tunables
    pub fn config(&self) -> &LaserBeamConfig {
        &self.config
    }

    /// Whether the beam is on
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Bodies killed so far
    pub fn kills(&self) -> u32 {
        self.kills
    }
}

impl Behavior for LaserBeam {
    fn kind(&self) -> ObstacleKind {
        ObstacleKind::LaserBeam
    }

    fn trigger(&self) -> Option<TriggerComponent> {
        let half_extents = Vec3::new(
            BEAM_HALF_THICKNESS,
            self.config.pillar_distance * 0.5,
            BEAM_HALF_THICKNESS,
        );
        Some(
            TriggerComponent::new(TriggerVolume::from_half_extents(half_extents))
                .with_filter(TriggerFilter::pawns_only()),
        )
    }

    fn trigger_pose(&self, root: &Transform) -> Option<Transform> {
        if !self.active {
            return None;
        }
        let beam = Transform::from_translation(Vec3::new(0.0, 0.0, self.config.beam_height));
        Some(root.mul_transform(beam))
    }

    fn begin_play(&mut self, cx: &mut BehaviorContext<'_>) {
        self.active = true;
        cx.schedule_repeating(self.config.beam_cycle * 0.5, BehaviorTimer::BeamToggle);
    }

    fn on_timer(&mut self, timer: BehaviorTimer, cx: &mut BehaviorContext<'_>) {
        if timer == BehaviorTimer::BeamToggle {
            self.active = !self.active;
            log::trace!("laser {} {}", cx.id, if self.active { "on" } else { "off" });
        }
    }

    fn on_enter(&mut self, other: EntityId, cx: &mut BehaviorContext<'_>) {
        if !self.active {
            return;
        }
        let Some(pawn) = cx.pawns.pawn_mut(other) else {
            return;
        };
        if pawn.is_dead() {
            return;
        }
        if pawn.kill() {
            self.kills += 1;
            log::info!("laser {} killed {}", cx.id, other);
        }
    }
}
