//! The course world
//!
//! Owns every entity on a course and runs the frame:
//!
//! ```text
//! game mode input
//!   -> characters (integrate, abilities, clip events)
//!   -> behavior timers
//!   -> behavior ticks, riders carried by their surface's motion
//!   -> projectile contacts with floor and surfaces
//!   -> overlaps, enter / exit dispatch
//!   -> queued world commands
//! ```
//!
//! Behaviors never touch the world directly. Spawns, removals and level
//! requests are queued during the frame and applied at its end, so handles
//! seen during dispatch stay valid until the frame is over.

use crate::body::BodySettings;
use crate::character::Character;
use crate::clip::{standard_clips, ClipLibrary};
use crate::error::{CourseError, Result};
use crate::floor::Floor;
use crate::game_mode::{GameMode, GameModeConfig};
use gauntlet_core::body::{Body, CharacterBody, Pawn, PawnRegistry};
use gauntlet_core::id::{EntityAllocator, EntityId};
use gauntlet_core::scene::{SceneGraph, Transform};
use gauntlet_locomotion::LocomotionTuning;
use gauntlet_obstacles::{
    Behavior, BehaviorContext, BehaviorTimer, Cannonball, SpawnRequest, Surface, WorldCommand,
};
use gauntlet_timer::TimerService;
use gauntlet_triggers::{TriggerEntity, TriggerPose, TriggerSystem, PAWN_TAG, PLAYER_TAG};
use glam::Vec3;
use std::collections::{BTreeMap, HashMap};

/// Thickness below a walkable face that still counts as touching it
const CONTACT_DEPTH: f32 = 20.0;

/// Rounds of command application per frame before giving up
const MAX_COMMAND_ROUNDS: usize = 8;

/// A ball in flight and where its centre was at the last contact pass
#[derive(Debug, Clone, Copy)]
struct Projectile {
    radius: f32,
    last: Vec3,
}

/// Characters by handle
#[derive(Debug, Default)]
struct Roster {
    characters: BTreeMap<EntityId, Character>,
}

impl PawnRegistry for Roster {
    fn pawn_mut(&mut self, id: EntityId) -> Option<&mut dyn Pawn> {
        self.characters.get_mut(&id).map(|character| character as &mut dyn Pawn)
    }

    fn contains(&self, id: EntityId) -> bool {
        self.characters.contains_key(&id)
    }
}

/// A running course
pub struct Course {
    name: String,
    allocator: EntityAllocator,
    scene: SceneGraph,
    timers: TimerService<BehaviorTimer>,
    triggers: TriggerSystem,
    behaviors: BTreeMap<EntityId, Box<dyn Behavior>>,
    roster: Roster,
    projectiles: HashMap<EntityId, Projectile>,
    floor: Floor,
    game_mode: GameMode,
    body_settings: BodySettings,
    clips: ClipLibrary,
    commands: Vec<WorldCommand>,
    pending_level: Option<String>,
    elapsed: f32,
    frame: u64,
}

impl Course {
    /// Empty course over `floor` with auto-run on
    pub fn new(name: impl Into<String>, floor: Floor) -> Self {
        Self {
            name: name.into(),
            allocator: EntityAllocator::new(),
            scene: SceneGraph::new(),
            timers: TimerService::new(),
            triggers: TriggerSystem::new(),
            behaviors: BTreeMap::new(),
            roster: Roster::default(),
            projectiles: HashMap::new(),
            floor,
            game_mode: GameMode::default(),
            body_settings: BodySettings::default(),
            clips: standard_clips(),
            commands: Vec::new(),
            pending_level: None,
            elapsed: 0.0,
            frame: 0,
        }
    }

    /// Replace the game mode rules
    pub fn with_game_mode(mut self, config: &GameModeConfig) -> Self {
        self.game_mode = GameMode::new(config);
        self
    }

    /// Body settings for characters spawned from now on
    pub fn with_body_settings(mut self, settings: BodySettings) -> Self {
        self.body_settings = settings;
        self
    }

    /// Clip library for characters spawned from now on
    pub fn with_clips(mut self, clips: ClipLibrary) -> Self {
        self.clips = clips;
        self
    }

    // ---- Population ----

    /// Place a behavior at `transform`. Its trigger is registered and
    /// `begin_play` runs immediately.
    pub fn add_behavior(&mut self, behavior: Box<dyn Behavior>, transform: Transform) -> EntityId {
        let id = self.allocator.allocate();
        self.scene.insert(id, transform);
        if let Some(trigger) = behavior.trigger() {
            self.triggers.register_trigger(id, trigger);
        }
        log::debug!("{} placed {} at {}", self.name, behavior.kind(), transform.translation);
        self.behaviors.insert(id, behavior);
        self.dispatch(id, |behavior, cx| behavior.begin_play(cx));
        id
    }

    /// Spawn a character, dropped onto whatever is below `transform`
    pub fn spawn_character(&mut self, transform: Transform, tuning: LocomotionTuning, player: bool) -> EntityId {
        let id = self.allocator.allocate();
        let mut character = Character::new(
            id,
            &transform,
            self.body_settings.clone(),
            tuning,
            self.clips.clone(),
            player,
        );
        let surfaces = self.surfaces();
        character.begin_play(&self.floor, &surfaces);
        log::info!("{} spawned {} at {}", self.name, id, character.position());
        self.roster.characters.insert(id, character);
        id
    }

    /// Remove a character or behavior right away
    pub fn despawn(&mut self, id: EntityId) -> Result<()> {
        if self.destroy(id) {
            Ok(())
        } else {
            Err(CourseError::UnknownEntity(id))
        }
    }

    fn destroy(&mut self, id: EntityId) -> bool {
        let was_behavior = self.behaviors.remove(&id).is_some();
        let was_character = self.roster.characters.remove(&id).is_some();
        if !was_behavior && !was_character {
            return false;
        }

        self.timers.cancel_owner(id);
        self.triggers.unregister_trigger(id);
        self.scene.remove(id);
        self.projectiles.remove(&id);
        self.allocator.free(id);

        for behavior in self.behaviors.values_mut() {
            behavior.on_entity_destroyed(id);
        }
        self.triggers.forget_entity(id);
        log::debug!("{} removed {}", self.name, id);
        true
    }

    // ---- Frame ----

    /// Advance the course by `dt` seconds. Non-positive or non-finite steps
    /// are ignored.
    pub fn step(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            log::warn!("{} ignoring step of {}s", self.name, dt);
            return;
        }
        self.frame += 1;
        self.elapsed += dt;

        for character in self.roster.characters.values_mut() {
            self.game_mode.drive(character);
        }

        let surfaces = self.surfaces();
        for character in self.roster.characters.values_mut() {
            character.update(dt, &self.floor, &surfaces);
        }

        for fired in self.timers.advance(dt) {
            self.dispatch(fired.owner, |behavior, cx| behavior.on_timer(fired.tag, cx));
        }

        let ids: Vec<EntityId> = self.behaviors.keys().copied().collect();
        let before: HashMap<EntityId, Vec3> = ids
            .iter()
            .filter_map(|id| self.scene.get(*id).map(|transform| (*id, transform.translation)))
            .collect();
        for &id in &ids {
            self.dispatch(id, |behavior, cx| behavior.tick(dt, cx));
        }
        self.carry_riders(&before);

        self.projectile_contacts();
        self.update_overlaps();
        self.apply_commands();
    }

    /// Run a callback on one behavior with a context over the world
    fn dispatch<F>(&mut self, id: EntityId, f: F)
    where
        F: FnOnce(&mut dyn Behavior, &mut BehaviorContext<'_>),
    {
        let Some(behavior) = self.behaviors.get_mut(&id) else {
            return;
        };
        let mut cx = BehaviorContext {
            id,
            scene: &mut self.scene,
            timers: &mut self.timers,
            pawns: &mut self.roster,
            commands: &mut self.commands,
        };
        f(behavior.as_mut(), &mut cx);
    }

    fn surfaces(&self) -> Vec<Surface> {
        self.behaviors
            .iter()
            .filter_map(|(id, behavior)| {
                let root = self.scene.get(*id)?;
                behavior.surface(*id, root)
            })
            .collect()
    }

    fn carry_riders(&mut self, before: &HashMap<EntityId, Vec3>) {
        for character in self.roster.characters.values_mut() {
            let Some(owner) = character.body().standing_on() else {
                continue;
            };
            let (Some(start), Some(now)) = (before.get(&owner), self.scene.get(owner)) else {
                continue;
            };
            let delta = now.translation - *start;
            if delta != Vec3::ZERO {
                character.add_world_offset(delta);
            }
        }
    }

    /// A ball touches a face when its path since the last pass reaches the
    /// face from above, no deeper than `CONTACT_DEPTH` under it. Support is
    /// checked where the path crosses the face.
    fn projectile_contacts(&mut self) {
        if self.projectiles.is_empty() {
            return;
        }
        let surfaces = self.surfaces();
        let mut contacts = Vec::new();
        for (&id, projectile) in self.projectiles.iter_mut() {
            let Some(transform) = self.scene.get(id) else {
                continue;
            };
            let now = transform.translation;
            let last = std::mem::replace(&mut projectile.last, now);
            let radius = projectile.radius;

            let touches = |height: f32| {
                now.z.min(last.z) - radius <= height && now.z.max(last.z) >= height - CONTACT_DEPTH
            };
            let crossing = |height: f32| {
                let drop = last.z - now.z;
                if drop <= f32::EPSILON {
                    return now;
                }
                last.lerp(now, ((last.z - radius - height) / drop).clamp(0.0, 1.0))
            };

            if let Some(surface) = surfaces.iter().find(|surface| {
                let height = surface.height();
                surface.owner != id && touches(height) && surface.supports(crossing(height), radius)
            }) {
                contacts.push((id, Some(surface.owner)));
            } else if self
                .floor
                .height_at(crossing(self.floor.height))
                .is_some_and(touches)
            {
                contacts.push((id, None));
            }
        }
        for (id, other) in contacts {
            self.dispatch(id, |behavior, cx| behavior.on_contact(other, cx));
        }
    }

    fn update_overlaps(&mut self) {
        let poses: Vec<TriggerPose> = self
            .triggers
            .trigger_ids()
            .map(|id| {
                let pose = self
                    .behaviors
                    .get(&id)
                    .zip(self.scene.get(id))
                    .and_then(|(behavior, root)| behavior.trigger_pose(root));
                match pose {
                    Some(transform) => TriggerPose::active(id, transform),
                    None => TriggerPose::inactive(id),
                }
            })
            .collect();

        let bodies: Vec<TriggerEntity> = self
            .roster
            .characters
            .values()
            .map(|character| {
                let body = character.body();
                let entity = TriggerEntity::new(character.id())
                    .with_position(body.position())
                    .with_capsule(body.capsule_radius(), body.capsule_half_height())
                    .with_tag(PAWN_TAG);
                if character.is_player_controlled() {
                    entity.with_tag(PLAYER_TAG)
                } else {
                    entity
                }
            })
            .collect();

        self.triggers.update(&poses, &bodies);
        for event in self.triggers.drain_events() {
            let other = event.other_entity;
            if event.is_enter() {
                self.dispatch(event.trigger_entity, |behavior, cx| behavior.on_enter(other, cx));
            } else {
                self.dispatch(event.trigger_entity, |behavior, cx| behavior.on_exit(other, cx));
            }
        }
    }

    fn apply_commands(&mut self) {
        for _ in 0..MAX_COMMAND_ROUNDS {
            if self.commands.is_empty() {
                return;
            }
            for command in std::mem::take(&mut self.commands) {
                self.apply(command);
            }
        }
        if !self.commands.is_empty() {
            log::warn!("{} dropping {} commands queued in a loop", self.name, self.commands.len());
            self.commands.clear();
        }
    }

    fn apply(&mut self, command: WorldCommand) {
        match command {
            WorldCommand::Spawn(SpawnRequest::Cannonball {
                owner,
                transform,
                velocity,
                config,
            }) => {
                let ball = Cannonball::new(owner, velocity, config);
                let radius = ball.radius();
                let id = self.add_behavior(Box::new(ball), transform);
                self.projectiles.insert(
                    id,
                    Projectile {
                        radius,
                        last: transform.translation,
                    },
                );
            }
            WorldCommand::Destroy(id) => {
                if !self.destroy(id) {
                    log::debug!("{} asked to remove {} twice", self.name, id);
                }
            }
            WorldCommand::LoadLevel(level) => match &self.pending_level {
                Some(pending) => {
                    log::debug!("{} already moving to {}, ignoring {}", self.name, pending, level)
                }
                None => {
                    log::info!("{} requested level {}", self.name, level);
                    self.pending_level = Some(level);
                }
            },
        }
    }

    // ---- Control ----

    fn character_mut(&mut self, id: EntityId) -> Result<&mut Character> {
        self.roster.characters.get_mut(&id).ok_or(CourseError::UnknownEntity(id))
    }

    /// Start a dash
    pub fn request_dash(&mut self, id: EntityId) -> Result<bool> {
        Ok(self.character_mut(id)?.request_dash())
    }

    /// Start a slide
    pub fn request_slide(&mut self, id: EntityId) -> Result<bool> {
        Ok(self.character_mut(id)?.request_slide())
    }

    /// Jump
    pub fn request_jump(&mut self, id: EntityId) -> Result<bool> {
        Ok(self.character_mut(id)?.jump())
    }

    /// Steer a character by hand
    pub fn set_move_input(&mut self, id: EntityId, input: Vec3) -> Result<()> {
        self.character_mut(id)?.set_move_input(input);
        Ok(())
    }

    /// Kill a character. `Ok(false)` if it was already dead.
    pub fn kill(&mut self, id: EntityId) -> Result<bool> {
        Ok(self.character_mut(id)?.kill())
    }

    /// Hand over the level change asked for, if any
    pub fn take_level_request(&mut self) -> Option<String> {
        self.pending_level.take()
    }

    // ---- Accessors ----

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Seconds simulated
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Frames simulated
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn floor(&self) -> &Floor {
        &self.floor
    }

    pub fn game_mode(&self) -> &GameMode {
        &self.game_mode
    }

    /// Level change waiting to be taken
    pub fn pending_level(&self) -> Option<&str> {
        self.pending_level.as_deref()
    }

    pub fn character(&self, id: EntityId) -> Option<&Character> {
        self.roster.characters.get(&id)
    }

    pub fn characters(&self) -> impl Iterator<Item = &Character> + '_ {
        self.roster.characters.values()
    }

    /// First player character
    pub fn player(&self) -> Option<&Character> {
        self.characters().find(|character| character.is_player_controlled())
    }

    pub fn behavior(&self, id: EntityId) -> Option<&dyn Behavior> {
        self.behaviors.get(&id).map(|behavior| behavior.as_ref())
    }

    pub fn behaviors(&self) -> impl Iterator<Item = (EntityId, &dyn Behavior)> + '_ {
        self.behaviors.iter().map(|(id, behavior)| (*id, behavior.as_ref()))
    }

    pub fn behavior_count(&self) -> usize {
        self.behaviors.len()
    }

    /// Cannonballs in flight
    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }

    /// Root transform of a behavior
    pub fn transform(&self, id: EntityId) -> Option<&Transform> {
        self.scene.get(id)
    }

    pub fn timers(&self) -> &TimerService<BehaviorTimer> {
        &self.timers
    }

    pub fn triggers(&self) -> &TriggerSystem {
        &self.triggers
    }

    /// Live entities of every kind
    pub fn entity_count(&self) -> usize {
        self.allocator.alive_count()
    }
}

impl std::fmt::Debug for Course {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Course")
            .field("name", &self.name)
            .field("frame", &self.frame)
            .field("behaviors", &self.behaviors.len())
            .field("characters", &self.roster.characters.len())
            .field("pending_level", &self.pending_level)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use gauntlet_goal::{GoalConfig, GoalVolume};
    use gauntlet_obstacles::{
        CannonConfig, LaserBeam, LaserBeamConfig, MovingPlatform, MovingPlatformConfig, ObstacleConfig,
        TrapFloor, TrapFloorConfig,
    };

    const DT: f32 = 1.0 / 64.0;

    fn run(course: &mut Course, seconds: f32) {
        let frames = (seconds / DT).round() as usize;
        for _ in 0..frames {
            course.step(DT);
        }
    }

    fn at(x: f32, y: f32, z: f32) -> Transform {
        Transform::from_translation(Vec3::new(x, y, z))
    }

    #[test]
    fn test_auto_run_moves_player_forward() {
        let mut course = Course::new("test", Floor::flat(0.0));
        let player = course.spawn_character(at(200.0, 0.0, 100.0), LocomotionTuning::default(), true);
        run(&mut course, 1.0);

        let runner = course.character(player).unwrap();
        assert!(runner.position().x > 600.0);
        assert_relative_eq!(runner.velocity().x, 500.0, epsilon = 1e-3);
        assert_eq!(course.frame(), 64);
    }

    #[test]
    fn test_bad_steps_are_ignored() {
        let mut course = Course::new("test", Floor::flat(0.0));
        course.step(f32::NAN);
        course.step(0.0);
        course.step(-1.0);
        assert_eq!(course.frame(), 0);
    }

    #[test]
    fn test_platform_carries_rider() {
        let mut course = Course::new("test", Floor::flat(-1000.0)).with_game_mode(&GameModeConfig::manual());
        let config = MovingPlatformConfig::default().with_motion(200.0, 150.0);
        let platform = course.add_behavior(Box::new(MovingPlatform::new(config)), at(0.0, 0.0, 200.0));
        let rider = course.spawn_character(at(0.0, 0.0, 400.0), LocomotionTuning::without_clips(), true);
        assert_eq!(course.character(rider).unwrap().body().standing_on(), Some(platform));

        run(&mut course, 0.5);
        let deck = course.transform(platform).unwrap().translation;
        let position = course.character(rider).unwrap().position();
        assert!(deck.y.abs() > 1.0);
        assert_relative_eq!(position.y, deck.y, epsilon = 1e-2);
        assert_relative_eq!(position.z, 210.0 + 96.0, epsilon = 1e-2);
    }

    #[test]
    fn test_cannonball_lands_and_is_removed() {
        let mut course = Course::new("test", Floor::flat(0.0));
        let config = ObstacleConfig::Cannon(CannonConfig {
            fire_interval: 8.0,
            ..Default::default()
        });
        course.add_behavior(config.build().unwrap(), at(0.0, 0.0, 0.0));
        assert_eq!(course.behavior_count(), 1);

        run(&mut course, 8.0 + DT);
        assert_eq!(course.projectile_count(), 1);
        assert_eq!(course.behavior_count(), 2);

        run(&mut course, 4.5);
        assert_eq!(course.projectile_count(), 0);
        assert_eq!(course.behavior_count(), 1);
        assert_eq!(course.entity_count(), 1);
    }

    #[test]
    fn test_fast_cannonball_lands_with_coarse_steps() {
        let mut course = Course::new("test", Floor::flat(0.0));
        let config = ObstacleConfig::Cannon(CannonConfig {
            fire_interval: 8.0,
            ..Default::default()
        });
        course.add_behavior(config.build().unwrap(), at(0.0, 0.0, 0.0));

        // Falling at over 1000 units/s the ball drops well past the contact
        // depth between frames
        let step = |course: &mut Course, frames: usize| {
            for _ in 0..frames {
                course.step(0.1);
            }
        };
        step(&mut course, 81);
        assert_eq!(course.projectile_count(), 1);

        step(&mut course, 40);
        assert_eq!(course.projectile_count(), 0);
        assert_eq!(course.behavior_count(), 1);
    }

    #[test]
    fn test_goal_requests_next_level_once() {
        let mut course = Course::new("test", Floor::flat(0.0));
        let goal = GoalConfig::default().with_next_level("Level_02").with_delay(0.5);
        course.add_behavior(Box::new(GoalVolume::new(goal)), at(1000.0, 0.0, 0.0));
        let player = course.spawn_character(at(200.0, 0.0, 100.0), LocomotionTuning::default(), true);

        run(&mut course, 3.0);
        assert_eq!(course.pending_level(), Some("Level_02"));
        let runner = course.character(player).unwrap();
        assert_eq!(runner.velocity(), Vec3::ZERO);
        assert!(runner.position().x < 1200.0);

        assert_eq!(course.take_level_request().as_deref(), Some("Level_02"));
        run(&mut course, 1.0);
        assert_eq!(course.take_level_request(), None);
    }

    #[test]
    fn test_trap_floor_drops_rider() {
        let floor = Floor::flat(0.0).with_gap(800.0, 1100.0);
        let mut course = Course::new("test", floor).with_game_mode(&GameModeConfig::manual());
        let tile = course.add_behavior(
            Box::new(TrapFloor::new(TrapFloorConfig::default().single_use())),
            at(950.0, 0.0, -10.0),
        );
        let runner = course.spawn_character(at(950.0, 0.0, 100.0), LocomotionTuning::without_clips(), true);
        assert_eq!(course.character(runner).unwrap().body().standing_on(), Some(tile));

        run(&mut course, 1.0);
        assert!(course.behavior(tile).is_some());
        assert_relative_eq!(course.character(runner).unwrap().body().feet(), 0.0, epsilon = 1e-3);

        run(&mut course, 3.0);
        assert!(course.behavior(tile).is_none());
        assert!(course.character(runner).unwrap().position().z < -500.0);
    }

    #[test]
    fn test_laser_kills_and_runner_respawns() {
        let mut course = Course::new("test", Floor::flat(0.0)).with_game_mode(&GameModeConfig::manual());
        let laser = course.add_behavior(Box::new(LaserBeam::new(LaserBeamConfig::default())), at(400.0, 0.0, 0.0));
        let runner = course.spawn_character(at(400.0, 0.0, 100.0), LocomotionTuning::default(), true);

        let mut died = false;
        for _ in 0..(6.0 / DT) as usize {
            course.step(DT);
            if course.character(runner).unwrap().is_dead() {
                died = true;
                break;
            }
        }
        assert!(died);
        assert!(course.behavior(laser).is_some());

        run(&mut course, 2.0);
        let character = course.character(runner).unwrap();
        assert_eq!(character.locomotion().deaths(), 1);
        assert_relative_eq!(character.position().x, 400.0);
    }

    #[test]
    fn test_control_of_unknown_entities() {
        let mut course = Course::new("test", Floor::flat(0.0));
        let player = course.spawn_character(at(0.0, 0.0, 100.0), LocomotionTuning::default(), true);
        let stranger = EntityId::new(99, 0);

        assert!(matches!(course.kill(stranger), Err(CourseError::UnknownEntity(id)) if id == stranger));
        assert!(course.despawn(stranger).is_err());

        assert!(course.kill(player).unwrap());
        assert!(!course.kill(player).unwrap());
        course.despawn(player).unwrap();
        assert!(course.character(player).is_none());
        assert!(course.request_dash(player).is_err());
        assert_eq!(course.entity_count(), 0);
    }
}
