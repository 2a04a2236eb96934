//! Test doubles for driving behaviors without a course

use crate::behavior::{Behavior, BehaviorContext, BehaviorTimer, WorldCommand};
use gauntlet_core::body::{apply_launch, Body, CameraBoom, MovementParams, Pawn, PawnRegistry};
use gauntlet_core::id::EntityId;
use gauntlet_core::scene::{SceneGraph, Transform};
use gauntlet_timer::TimerService;
use glam::{Quat, Vec3};
use std::collections::HashMap;

/// A pawn that records what obstacles did to it
#[derive(Debug, Clone)]
pub struct TestPawn {
    pub id: EntityId,
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub on_ground: bool,
    pub collision: bool,
    pub movement: MovementParams,
    pub player: bool,
    pub dead: bool,
    pub deaths: u32,
    pub jump_pad_launched: bool,
    pub frozen: bool,
    pub boom: Option<CameraBoom>,
    pub launches: Vec<(Vec3, bool, bool)>,
}

impl TestPawn {
    /// Grounded player pawn at `position` with a camera boom
    pub fn player(id: EntityId, position: Vec3) -> Self {
        Self {
            id,
            position,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            on_ground: true,
            collision: true,
            movement: MovementParams::default(),
            player: true,
            dead: false,
            deaths: 0,
            jump_pad_launched: false,
            frozen: false,
            boom: Some(CameraBoom::default()),
            launches: Vec::new(),
        }
    }

    /// Pawn nobody controls
    pub fn npc(id: EntityId, position: Vec3) -> Self {
        Self {
            player: false,
            boom: None,
            ..Self::player(id, position)
        }
    }
}

impl Body for TestPawn {
    fn id(&self) -> EntityId {
        self.id
    }
    fn position(&self) -> Vec3 {
        self.position
    }
    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }
    fn rotation(&self) -> Quat {
        self.rotation
    }
    fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }
    fn velocity(&self) -> Vec3 {
        self.velocity
    }
    fn launch(&mut self, velocity: Vec3, override_xy: bool, override_z: bool) {
        self.launches.push((velocity, override_xy, override_z));
        self.velocity = apply_launch(self.velocity, velocity, override_xy, override_z);
        if self.velocity.z > 0.0 {
            self.on_ground = false;
        }
    }
    fn is_on_ground(&self) -> bool {
        self.on_ground
    }
    fn set_collision_enabled(&mut self, enabled: bool) {
        self.collision = enabled;
    }
    fn is_collision_enabled(&self) -> bool {
        self.collision
    }
    fn add_world_offset(&mut self, offset: Vec3) {
        self.position += offset;
    }
}

impl Pawn for TestPawn {
    fn movement(&self) -> MovementParams {
        self.movement
    }
    fn set_movement(&mut self, params: MovementParams) {
        self.movement = params;
    }
    fn is_player_controlled(&self) -> bool {
        self.player
    }
    fn is_dead(&self) -> bool {
        self.dead
    }
    fn kill(&mut self) -> bool {
        if self.dead {
            return false;
        }
        self.dead = true;
        self.deaths += 1;
        true
    }
    fn mark_jump_pad_launched(&mut self) {
        self.jump_pad_launched = true;
    }
    fn freeze(&mut self) {
        self.velocity = Vec3::ZERO;
        self.frozen = true;
    }
    fn camera_boom_mut(&mut self) -> Option<&mut CameraBoom> {
        self.boom.as_mut()
    }
}

/// Pawns by handle
#[derive(Debug, Default)]
pub struct TestPawns {
    pub pawns: HashMap<EntityId, TestPawn>,
}

impl TestPawns {
    /// Add a pawn
    pub fn add(&mut self, pawn: TestPawn) {
        self.pawns.insert(pawn.id, pawn);
    }

    /// Look a pawn up
    pub fn get(&self, id: EntityId) -> &TestPawn {
        &self.pawns[&id]
    }

    /// Remove a pawn
    pub fn remove(&mut self, id: EntityId) -> Option<TestPawn> {
        self.pawns.remove(&id)
    }
}

impl PawnRegistry for TestPawns {
    fn pawn_mut(&mut self, id: EntityId) -> Option<&mut dyn Pawn> {
        self.pawns.get_mut(&id).map(|pawn| pawn as &mut dyn Pawn)
    }

    fn contains(&self, id: EntityId) -> bool {
        self.pawns.contains_key(&id)
    }
}

/// World state a single behavior runs against
#[derive(Debug, Default)]
pub struct Harness {
    pub scene: SceneGraph,
    pub timers: TimerService<BehaviorTimer>,
    pub pawns: TestPawns,
    pub commands: Vec<WorldCommand>,
}

impl Harness {
    /// Empty world
    pub fn new() -> Self {
        Self::default()
    }

    /// Place an entity
    pub fn place(&mut self, id: EntityId, transform: Transform) {
        self.scene.insert(id, transform);
    }

    /// Context for `id`
    pub fn cx(&mut self, id: EntityId) -> BehaviorContext<'_> {
        BehaviorContext {
            id,
            scene: &mut self.scene,
            timers: &mut self.timers,
            pawns: &mut self.pawns,
            commands: &mut self.commands,
        }
    }

    /// Run `begin_play`
    pub fn begin(&mut self, id: EntityId, behavior: &mut dyn Behavior) {
        behavior.begin_play(&mut self.cx(id));
    }

    /// One frame: due timers first, then the tick
    pub fn step(&mut self, id: EntityId, behavior: &mut dyn Behavior, dt: f32) {
        for fired in self.timers.advance(dt) {
            if fired.owner == id {
                behavior.on_timer(fired.tag, &mut self.cx(id));
            }
        }
        behavior.tick(dt, &mut self.cx(id));
    }

    /// Current transform of `id`
    pub fn transform(&self, id: EntityId) -> Transform {
        self.scene.get(id).copied().unwrap_or_default()
    }

    /// Take queued commands
    pub fn drain_commands(&mut self) -> Vec<WorldCommand> {
        std::mem::take(&mut self.commands)
    }
}
