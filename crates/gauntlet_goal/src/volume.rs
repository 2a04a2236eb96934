//! Finish-line volume
//!
//! The first player pawn to walk in is frozen. Then either the follow camera
//! swings once around it (eased in and out) or a plain delay runs, and
//! finally the next level is requested.

use crate::config::{GoalConfig, GoalSequence};
use gauntlet_core::id::EntityId;
use gauntlet_core::math::ease_in_out;
use gauntlet_core::scene::Transform;
use gauntlet_obstacles::{Behavior, BehaviorContext, BehaviorTimer, ObstacleKind};
use gauntlet_triggers::{TriggerComponent, TriggerFilter, TriggerVolume};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Exponent of the orbit easing curve
const ORBIT_EASE_EXPONENT: f32 = 2.0;

/// Degrees covered by one orbit
const ORBIT_SWEEP: f32 = 360.0;

/// Progress through the goal sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalState {
    /// Waiting for a player
    Armed,
    /// Player frozen, delay running
    Triggered,
    /// Camera swinging around the player
    Orbiting,
    /// Sequence over, level change asked for
    Transitioning,
}

/// Goal volume at the end of a course
#[derive(Debug, Clone)]
pub struct GoalVolume {
    config: GoalConfig,
    state: GoalState,
    target: Option<EntityId>,
    elapsed: f32,
    start_yaw: f32,
}

impl GoalVolume {
    /// Create an armed goal
    pub fn new(config: GoalConfig) -> Self {
        Self {
            config,
            state: GoalState::Armed,
            target: None,
            elapsed: 0.0,
            start_yaw: 0.0,
        }
    }

    /// Tunables
    pub fn config(&self) -> &GoalConfig {
        &self.config
    }

    /// Current state
    pub fn state(&self) -> GoalState {
        self.state
    }

    /// Player that reached the goal
    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    /// Seconds into the orbit
    pub fn orbit_elapsed(&self) -> f32 {
        self.elapsed
    }

    fn start_orbit(&mut self, player: EntityId, cx: &mut BehaviorContext<'_>) {
        let (radius, pitch) = match &self.config.sequence {
            GoalSequence::Orbit(orbit) => (orbit.orbit_radius, orbit.orbit_pitch),
            GoalSequence::Delay(_) => return,
        };
        let boom = cx.pawns.pawn_mut(player).and_then(|pawn| pawn.camera_boom_mut());
        let Some(boom) = boom else {
            log::debug!("goal {}: {} has no camera boom, skipping orbit", cx.id, player);
            self.finish(cx);
            return;
        };
        self.start_yaw = boom.yaw;
        boom.use_pawn_control_rotation = false;
        boom.camera_lag = false;
        boom.rotation_lag = false;
        boom.arm_length = radius;
        boom.pitch = pitch;

        self.elapsed = 0.0;
        self.state = GoalState::Orbiting;
    }

    fn finish(&mut self, cx: &mut BehaviorContext<'_>) {
        self.state = GoalState::Transitioning;
        match &self.config.next_level {
            Some(level) => {
                log::info!("goal {} requesting level {}", cx.id, level);
                cx.load_level(level.clone());
            }
            None => log::warn!("goal {} reached but no next level is set", cx.id),
        }
    }
}

impl Behavior for GoalVolume {
    fn kind(&self) -> ObstacleKind {
        ObstacleKind::Goal
    }

    fn trigger(&self) -> Option<TriggerComponent> {
        Some(
            TriggerComponent::new(TriggerVolume::from_half_extents(self.config.half_extents))
                .with_filter(TriggerFilter::player_only()),
        )
    }

    fn trigger_pose(&self, root: &Transform) -> Option<Transform> {
        let lift = Vec3::new(0.0, 0.0, self.config.half_extents.z);
        Some(root.mul_transform(Transform::from_translation(lift)))
    }

    fn tick(&mut self, dt: f32, cx: &mut BehaviorContext<'_>) {
        if self.state != GoalState::Orbiting {
            return;
        }
        let GoalSequence::Orbit(orbit) = &self.config.sequence else {
            return;
        };
        self.elapsed += dt;
        let duration = orbit.orbit_duration;
        let pitch = orbit.orbit_pitch;

        let boom = match self.target {
            Some(id) => cx.pawns.pawn_mut(id).and_then(|pawn| pawn.camera_boom_mut()),
            None => None,
        };
        let done = match boom {
            Some(boom) if self.elapsed < duration => {
                let eased = ease_in_out(0.0, 1.0, self.elapsed / duration, ORBIT_EASE_EXPONENT);
                boom.yaw = self.start_yaw + eased * ORBIT_SWEEP;
                boom.pitch = pitch;
                false
            }
            _ => true,
        };
        if done {
            self.finish(cx);
        }
    }

    fn on_enter(&mut self, other: EntityId, cx: &mut BehaviorContext<'_>) {
        if self.state != GoalState::Armed {
            log::debug!("goal {} already triggered, ignoring {}", cx.id, other);
            return;
        }
        let Some(pawn) = cx.pawns.pawn_mut(other) else {
            return;
        };
        if !pawn.is_player_controlled() {
            return;
        }
        pawn.freeze();
        self.target = Some(other);
        self.state = GoalState::Triggered;
        log::info!("goal {} triggered by {}", cx.id, other);

        match &self.config.sequence {
            GoalSequence::Orbit(_) => self.start_orbit(other, cx),
            GoalSequence::Delay(delay) => {
                cx.schedule_once(delay.transition_delay, BehaviorTimer::Transition);
            }
        }
    }

    fn on_timer(&mut self, timer: BehaviorTimer, cx: &mut BehaviorContext<'_>) {
        if timer == BehaviorTimer::Transition && self.state == GoalState::Triggered {
            self.finish(cx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use gauntlet_obstacles::testing::{Harness, TestPawn};
    use gauntlet_obstacles::WorldCommand;

    const GOAL: EntityId = EntityId::new(1, 0);
    const PLAYER: EntityId = EntityId::new(2, 0);

    fn setup(config: GoalConfig) -> (Harness, GoalVolume) {
        let mut harness = Harness::new();
        harness.place(GOAL, Transform::from_translation(Vec3::new(25000.0, 0.0, 0.0)));
        let mut player = TestPawn::player(PLAYER, Vec3::new(25000.0, 0.0, 96.0));
        player.velocity = Vec3::new(500.0, 0.0, 0.0);
        if let Some(boom) = player.boom.as_mut() {
            boom.yaw = 30.0;
            boom.camera_lag = true;
            boom.rotation_lag = true;
        }
        harness.pawns.add(player);
        let mut goal = GoalVolume::new(config);
        harness.begin(GOAL, &mut goal);
        (harness, goal)
    }

    fn level_requests(harness: &Harness) -> Vec<&str> {
        harness
            .commands
            .iter()
            .filter_map(|command| match command {
                WorldCommand::LoadLevel(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_npc_does_not_trigger() {
        let (mut harness, mut goal) = setup(GoalConfig::default().with_next_level("Level_02"));
        let npc = EntityId::new(3, 0);
        harness.pawns.add(TestPawn::npc(npc, Vec3::ZERO));

        goal.on_enter(npc, &mut harness.cx(GOAL));
        assert_eq!(goal.state(), GoalState::Armed);
        assert!(!harness.pawns.get(npc).frozen);
    }

    #[test]
    fn test_orbit_sweeps_then_requests_level() {
        let (mut harness, mut goal) = setup(GoalConfig::default().with_next_level("Level_02"));
        goal.on_enter(PLAYER, &mut harness.cx(GOAL));

        let player = harness.pawns.get(PLAYER);
        assert!(player.frozen);
        assert_eq!(player.velocity, Vec3::ZERO);
        let boom = player.boom.unwrap();
        assert!(!boom.use_pawn_control_rotation);
        assert!(!boom.camera_lag && !boom.rotation_lag);
        assert_relative_eq!(boom.arm_length, 600.0);
        assert_eq!(goal.state(), GoalState::Orbiting);

        let dt = 1.0 / 64.0;
        for _ in 0..128 {
            harness.step(GOAL, &mut goal, dt);
        }
        let boom = harness.pawns.get(PLAYER).boom.unwrap();
        assert_relative_eq!(boom.yaw, 210.0, epsilon = 1e-3);
        assert_relative_eq!(boom.pitch, -20.0);
        assert!(level_requests(&harness).is_empty());

        for _ in 0..127 {
            harness.step(GOAL, &mut goal, dt);
        }
        assert_eq!(goal.state(), GoalState::Orbiting);
        harness.step(GOAL, &mut goal, dt);
        assert_eq!(goal.state(), GoalState::Transitioning);

        for _ in 0..64 {
            harness.step(GOAL, &mut goal, dt);
        }
        assert_eq!(level_requests(&harness), vec!["Level_02"]);
    }

    #[test]
    fn test_second_entry_ignored() {
        let (mut harness, mut goal) = setup(GoalConfig::default().with_next_level("Level_02"));
        let other = EntityId::new(3, 0);
        harness.pawns.add(TestPawn::player(other, Vec3::ZERO));

        goal.on_enter(PLAYER, &mut harness.cx(GOAL));
        goal.on_enter(other, &mut harness.cx(GOAL));
        assert_eq!(goal.target(), Some(PLAYER));
        assert!(!harness.pawns.get(other).frozen);
    }

    #[test]
    fn test_delay_sequence() {
        let (mut harness, mut goal) = setup(GoalConfig::default().with_next_level("Level_02").with_delay(3.0));
        goal.on_enter(PLAYER, &mut harness.cx(GOAL));
        assert_eq!(goal.state(), GoalState::Triggered);
        // The camera is left alone
        assert!(harness.pawns.get(PLAYER).boom.unwrap().use_pawn_control_rotation);

        for _ in 0..11 {
            harness.step(GOAL, &mut goal, 0.25);
        }
        assert!(level_requests(&harness).is_empty());
        harness.step(GOAL, &mut goal, 0.25);
        assert_eq!(level_requests(&harness), vec!["Level_02"]);
        assert_eq!(goal.state(), GoalState::Transitioning);
    }

    #[test]
    fn test_missing_level_only_warns() {
        let (mut harness, mut goal) = setup(GoalConfig::default().with_delay(0.5));
        goal.on_enter(PLAYER, &mut harness.cx(GOAL));
        harness.step(GOAL, &mut goal, 0.5);
        assert_eq!(goal.state(), GoalState::Transitioning);
        assert!(harness.commands.is_empty());
    }

    #[test]
    fn test_orbit_ends_early_when_player_vanishes() {
        let (mut harness, mut goal) = setup(GoalConfig::default().with_next_level("Level_02"));
        goal.on_enter(PLAYER, &mut harness.cx(GOAL));
        harness.step(GOAL, &mut goal, 0.5);
        harness.pawns.remove(PLAYER);
        harness.step(GOAL, &mut goal, 0.5);

        assert_eq!(goal.state(), GoalState::Transitioning);
        assert_eq!(level_requests(&harness), vec!["Level_02"]);
    }

    #[test]
    fn test_finish_box_rests_on_root() {
        let goal = GoalVolume::new(GoalConfig::default());
        let pose = goal.trigger_pose(&Transform::IDENTITY).unwrap();
        assert_relative_eq!(pose.translation.z, 200.0);
    }
}
