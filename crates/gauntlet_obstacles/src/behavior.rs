//! The contract every obstacle implements
//!
//! An obstacle is configuration plus reactive state. It never owns its
//! transform: the scene graph does, and the course hands each callback a
//! [`BehaviorContext`] to read and write it, schedule timers, reach pawns and
//! queue world changes.

use crate::cannonball::CannonballConfig;
use gauntlet_core::body::PawnRegistry;
use gauntlet_core::id::EntityId;
use gauntlet_core::scene::{SceneGraph, Transform};
use gauntlet_timer::{TimerHandle, TimerService};
use gauntlet_triggers::TriggerComponent;
use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which obstacle a behavior is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    MovingPlatform,
    Pendulum,
    RotatingPillar,
    TrapFloor,
    LaserBeam,
    JumpPad,
    ConveyorBelt,
    IceSurface,
    Cannon,
    Cannonball,
    Goal,
}

impl fmt::Display for ObstacleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MovingPlatform => "moving platform",
            Self::Pendulum => "pendulum",
            Self::RotatingPillar => "rotating pillar",
            Self::TrapFloor => "trap floor",
            Self::LaserBeam => "laser beam",
            Self::JumpPad => "jump pad",
            Self::ConveyorBelt => "conveyor belt",
            Self::IceSurface => "ice surface",
            Self::Cannon => "cannon",
            Self::Cannonball => "cannonball",
            Self::Goal => "goal",
        };
        f.write_str(name)
    }
}

/// Timer tags behaviors schedule on the shared service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorTimer {
    /// Trap floor starts falling
    FallDelay,
    /// Trap floor comes back
    Respawn,
    /// Laser flips on or off
    BeamToggle,
    /// Cannon shoots
    Fire,
    /// Projectile expires
    Lifespan,
    /// Goal loads the next level
    Transition,
}

/// Entities an obstacle asks the world to create
#[derive(Debug, Clone, PartialEq)]
pub enum SpawnRequest {
    /// A cannonball leaving a muzzle
    Cannonball {
        /// Cannon that fired it; never hit by it
        owner: EntityId,
        /// Muzzle pose
        transform: Transform,
        /// Launch velocity
        velocity: Vec3,
        /// Projectile tunables
        config: CannonballConfig,
    },
}

/// World changes queued by behaviors, applied after the frame's dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum WorldCommand {
    /// Create an entity
    Spawn(SpawnRequest),
    /// Remove an entity and everything it scheduled
    Destroy(EntityId),
    /// Ask for a level change
    LoadLevel(String),
}

/// A walkable top face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    /// Obstacle providing it
    pub owner: EntityId,
    /// Centre of the top face
    pub center: Vec3,
    /// Orientation of the face
    pub rotation: Quat,
    /// Half size along the face's local X and Y
    pub half_size: Vec2,
}

impl Surface {
    /// Top face of a box of `half_extents` centred on `root`
    pub fn deck(owner: EntityId, root: &Transform, half_extents: Vec3) -> Self {
        Self {
            owner,
            center: root.transform_point(Vec3::new(0.0, 0.0, half_extents.z)),
            rotation: root.rotation,
            half_size: half_extents.truncate(),
        }
    }

    /// World height of the face
    pub fn height(&self) -> f32 {
        self.center.z
    }

    /// Whether a point lies over the face, allowing `margin` past its edges
    pub fn supports(&self, point: Vec3, margin: f32) -> bool {
        let local = self.rotation.inverse() * (point - self.center);
        local.x.abs() <= self.half_size.x + margin && local.y.abs() <= self.half_size.y + margin
    }
}

/// Everything a behavior callback may touch
pub struct BehaviorContext<'a> {
    /// The behavior's own entity
    pub id: EntityId,
    pub scene: &'a mut SceneGraph,
    pub timers: &'a mut TimerService<BehaviorTimer>,
    pub pawns: &'a mut dyn PawnRegistry,
    pub commands: &'a mut Vec<WorldCommand>,
}

impl<'a> BehaviorContext<'a> {
    /// Own transform, identity if the scene lost it
    pub fn transform(&self) -> Transform {
        self.scene.get(self.id).copied().unwrap_or_default()
    }

    /// Replace own transform
    pub fn set_transform(&mut self, transform: Transform) {
        self.scene.insert(self.id, transform);
    }

    /// Schedule a one-shot timer for this behavior
    pub fn schedule_once(&mut self, delay: f32, timer: BehaviorTimer) -> TimerHandle {
        self.timers.schedule_once(self.id, delay, timer)
    }

    /// Schedule a repeating timer for this behavior
    pub fn schedule_repeating(&mut self, period: f32, timer: BehaviorTimer) -> Option<TimerHandle> {
        self.timers.schedule_repeating(self.id, period, timer)
    }

    /// Cancel one of this behavior's timers
    pub fn cancel(&mut self, timer: BehaviorTimer) -> bool {
        self.timers.cancel_tag(self.id, timer)
    }

    /// Queue a spawn
    pub fn spawn(&mut self, request: SpawnRequest) {
        self.commands.push(WorldCommand::Spawn(request));
    }

    /// Queue removal of this behavior's entity
    pub fn destroy_self(&mut self) {
        self.commands.push(WorldCommand::Destroy(self.id));
    }

    /// Queue a level change
    pub fn load_level(&mut self, name: impl Into<String>) {
        self.commands.push(WorldCommand::LoadLevel(name.into()));
    }
}

/// Reactive policy of one obstacle.
///
/// Every callback defaults to doing nothing; obstacles override the ones
/// they react to. Callbacks never fail: bad input is ignored.
pub trait Behavior: fmt::Debug {
    /// Which obstacle this is
    fn kind(&self) -> ObstacleKind;

    /// Overlap volume to register at placement
    fn trigger(&self) -> Option<TriggerComponent> {
        None
    }

    /// World pose of the overlap volume this frame given the root
    /// transform. `None` while its collision is off.
    fn trigger_pose(&self, _root: &Transform) -> Option<Transform> {
        None
    }

    /// Walkable top face, if bodies can stand on this obstacle
    fn surface(&self, _id: EntityId, _root: &Transform) -> Option<Surface> {
        None
    }

    /// Placement finished
    fn begin_play(&mut self, _cx: &mut BehaviorContext<'_>) {}

    /// Once per frame
    fn tick(&mut self, _dt: f32, _cx: &mut BehaviorContext<'_>) {}

    /// A body started overlapping the volume
    fn on_enter(&mut self, _other: EntityId, _cx: &mut BehaviorContext<'_>) {}

    /// A body stopped overlapping the volume
    fn on_exit(&mut self, _other: EntityId, _cx: &mut BehaviorContext<'_>) {}

    /// Blocking contact; `None` is the level geometry
    fn on_contact(&mut self, _other: Option<EntityId>, _cx: &mut BehaviorContext<'_>) {}

    /// One of this behavior's timers fired
    fn on_timer(&mut self, _timer: BehaviorTimer, _cx: &mut BehaviorContext<'_>) {}

    /// Some entity left the world; drop anything keyed on it
    fn on_entity_destroyed(&mut self, _entity: EntityId) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauntlet_core::math::yaw_rotation;

    #[test]
    fn test_deck_surface_follows_root() {
        let owner = EntityId::new(4, 0);
        let root = Transform::from_translation(Vec3::new(1000.0, 0.0, 50.0)).with_rotation(yaw_rotation(90.0));
        let surface = Surface::deck(owner, &root, Vec3::new(200.0, 50.0, 10.0));

        assert_eq!(surface.height(), 60.0);
        // Rotated 90°: local X runs along world Y
        assert!(surface.supports(Vec3::new(1000.0, 190.0, 100.0), 0.0));
        assert!(!surface.supports(Vec3::new(1100.0, 0.0, 100.0), 0.0));
        assert!(surface.supports(Vec3::new(1060.0, 0.0, 100.0), 20.0));
    }

    #[test]
    fn test_context_queues_commands() {
        let mut scene = SceneGraph::new();
        let mut timers = TimerService::new();
        let mut pawns = gauntlet_core::body::NoPawns;
        let mut commands = Vec::new();
        let id = EntityId::new(1, 0);
        let mut cx = BehaviorContext {
            id,
            scene: &mut scene,
            timers: &mut timers,
            pawns: &mut pawns,
            commands: &mut commands,
        };

        assert_eq!(cx.transform(), Transform::IDENTITY);
        cx.schedule_once(1.0, BehaviorTimer::Fire);
        cx.load_level("Level_02");
        cx.destroy_self();
        assert!(cx.cancel(BehaviorTimer::Fire));

        assert_eq!(
            commands,
            vec![WorldCommand::LoadLevel("Level_02".to_string()), WorldCommand::Destroy(id)]
        );
    }
}
