//! Course layouts
//!
//! A layout is the JSON description of a course: floor, player, obstacles
//! and goal. [`CourseLayout::build`] validates everything once and places it
//! into a fresh [`Course`].
//!
//! ```json
//! {
//!   "name": "mini",
//!   "floor": { "height": 0.0, "gaps": [{ "start": 1200.0, "end": 1400.0 }] },
//!   "obstacles": [
//!     { "position": [1000.0, 0.0, 0.0], "obstacle": { "type": "jump_pad", "launch_force": 1800.0 } }
//!   ],
//!   "goal": { "position": [3000.0, 0.0, 0.0], "goal": { "next_level": "mini_02" } }
//! }
//! ```

use crate::body::BodySettings;
use crate::clip::{standard_clips, ClipLibrary};
use crate::course::Course;
use crate::error::{CourseError, Result};
use crate::floor::Floor;
use crate::game_mode::GameModeConfig;
use gauntlet_core::config::{finite, finite_vec, Validate};
use gauntlet_core::error::ConfigError;
use gauntlet_core::math::yaw_rotation;
use gauntlet_core::scene::Transform;
use gauntlet_goal::{GoalConfig, GoalVolume};
use gauntlet_locomotion::LocomotionTuning;
use gauntlet_obstacles::{
    CannonConfig, ConveyorBeltConfig, IceSurfaceConfig, JumpPadConfig, LaserBeamConfig, MovingPlatformConfig,
    ObstacleConfig, RotatingPillarConfig, TrapFloorConfig,
};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Player spawn and abilities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerLayout {
    /// Spawn point; the character drops onto the ground below it
    pub spawn: Vec3,
    /// Facing in degrees
    pub yaw: f32,
    pub tuning: LocomotionTuning,
    pub body: BodySettings,
}

impl Default for PlayerLayout {
    fn default() -> Self {
        Self {
            spawn: Vec3::new(200.0, 0.0, 100.0),
            yaw: 0.0,
            tuning: LocomotionTuning::default(),
            body: BodySettings::default(),
        }
    }
}

/// One obstacle on the course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Root position
    pub position: Vec3,
    /// Facing in degrees
    #[serde(default)]
    pub yaw: f32,
    /// Name used in logs and errors
    #[serde(default)]
    pub label: Option<String>,
    pub obstacle: ObstacleConfig,
}

impl Placement {
    /// Obstacle at `(x, y, z)`
    pub fn new(obstacle: ObstacleConfig, x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vec3::new(x, y, z),
            yaw: 0.0,
            label: None,
            obstacle,
        }
    }

    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn transform(&self) -> Transform {
        Transform::from_translation(self.position).with_rotation(yaw_rotation(self.yaw))
    }
}

/// Finish line placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalPlacement {
    pub position: Vec3,
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub goal: GoalConfig,
}

/// Full course description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseLayout {
    pub name: String,
    pub floor: Floor,
    /// Falling below this height kills, unless the tuning sets its own
    pub kill_z: Option<f32>,
    pub game_mode: GameModeConfig,
    pub player: PlayerLayout,
    pub clips: ClipLibrary,
    pub obstacles: Vec<Placement>,
    pub goal: Option<GoalPlacement>,
}

impl Default for CourseLayout {
    fn default() -> Self {
        Self {
            name: "course".to_string(),
            floor: Floor::default(),
            kill_z: None,
            game_mode: GameModeConfig::default(),
            player: PlayerLayout::default(),
            clips: standard_clips(),
            obstacles: Vec::new(),
            goal: None,
        }
    }
}

impl FromStr for CourseLayout {
    type Err = CourseError;

    fn from_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl CourseLayout {
    /// Read a layout from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let layout = Self::from_str(&json)?;
        log::info!("Loaded course '{}' from {}", layout.name, path.display());
        Ok(layout)
    }

    /// Pretty JSON for this layout
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the layout and place everything in a new course
    pub fn build(&self) -> Result<Course> {
        let floor = self.floor.clone().validated().map_err(CourseError::InvalidFloor)?;
        let game_mode = self.game_mode.clone().validated().map_err(CourseError::InvalidPlayer)?;
        let body = self.player.body.clone().validated().map_err(CourseError::InvalidPlayer)?;
        let mut tuning = self.player.tuning.clone().validated().map_err(CourseError::InvalidPlayer)?;
        if tuning.kill_z.is_none() {
            tuning.kill_z = self.kill_z.map(|z| finite("kill_z", z)).transpose().map_err(CourseError::InvalidPlayer)?;
        }
        let spawn = finite_vec("player.spawn", self.player.spawn).map_err(CourseError::InvalidPlayer)?;
        let yaw = finite("player.yaw", self.player.yaw).map_err(CourseError::InvalidPlayer)?;

        let mut clips = ClipLibrary::with_capacity(self.clips.len());
        for (name, clip) in &self.clips {
            clips.insert(name.clone(), clip.clone().validated().map_err(CourseError::InvalidPlayer)?);
        }

        let mut course = Course::new(self.name.clone(), floor)
            .with_game_mode(&game_mode)
            .with_body_settings(body)
            .with_clips(clips);

        for (index, placement) in self.obstacles.iter().enumerate() {
            let label = placement
                .label
                .clone()
                .unwrap_or_else(|| placement.obstacle.kind().to_string());
            let invalid = |source: ConfigError| CourseError::InvalidObstacle {
                index,
                label: label.clone(),
                source,
            };
            finite_vec("position", placement.position).map_err(invalid)?;
            finite("yaw", placement.yaw).map_err(invalid)?;
            let behavior = placement.obstacle.clone().build().map_err(invalid)?;
            course.add_behavior(behavior, placement.transform());
        }

        if let Some(goal) = &self.goal {
            let config = goal.goal.clone().validated().map_err(CourseError::InvalidGoal)?;
            let position = finite_vec("goal.position", goal.position).map_err(CourseError::InvalidGoal)?;
            let transform = Transform::from_translation(position).with_rotation(yaw_rotation(goal.yaw));
            course.add_behavior(Box::new(GoalVolume::new(config)), transform);
        }

        let spawn = Transform::from_translation(spawn).with_rotation(yaw_rotation(yaw));
        course.spawn_character(spawn, tuning, true);

        log::info!(
            "Built course '{}': {} obstacles, goal: {}",
            self.name,
            self.obstacles.len(),
            self.goal.is_some()
        );
        Ok(course)
    }

    /// The first obstacle level: six sections of rising difficulty along a
    /// 25 500 unit strip, 28 obstacles and a goal at the far end
    pub fn level_one() -> Self {
        use ObstacleConfig::*;

        let conveyor = |speed: f32, reverse: bool| {
            ConveyorBelt(ConveyorBeltConfig {
                belt_speed: speed,
                reverse_direction: reverse,
                ..Default::default()
            })
        };
        let pillar = |height: f32, speed: f32| {
            RotatingPillar(RotatingPillarConfig {
                pillar_height: height,
                rotation_speed: speed,
                ..Default::default()
            })
        };
        let trap = |fall_delay: f32| {
            TrapFloor(TrapFloorConfig {
                fall_delay,
                ..Default::default()
            })
        };
        let laser = |cycle: f32| {
            LaserBeam(LaserBeamConfig {
                beam_cycle: cycle,
                ..Default::default()
            })
        };
        let cannon = |interval: f32| {
            Cannon(CannonConfig {
                fire_interval: interval,
                ..Default::default()
            })
        };
        let jump_pad = |force: f32| {
            JumpPad(JumpPadConfig {
                launch_force: force,
                ..Default::default()
            })
        };
        let platform = |distance: f32, speed: f32| {
            MovingPlatform(MovingPlatformConfig::default().with_motion(distance, speed))
        };
        let ice = || IceSurface(IceSurfaceConfig::default());

        let obstacles = vec![
            // Tutorial
            Placement::new(conveyor(300.0, true), 2500.0, 0.0, 0.0).with_label("O01_ConveyorBelt_Reverse"),
            Placement::new(pillar(150.0, 90.0), 3800.0, 0.0, 0.0).with_label("O02_RotatingPillar"),
            Placement::new(trap(1.5), 5150.0, 0.0, 0.0).with_label("O03_TrapFloor"),
            // Timing
            Placement::new(laser(3.0), 6800.0, 0.0, 0.0).with_label("O04_LaserBeam"),
            Placement::new(cannon(2.0), 8200.0, -350.0, 0.0)
                .with_yaw(90.0)
                .with_label("O05_Cannon_Left"),
            Placement::new(cannon(2.0), 9200.0, 350.0, 0.0)
                .with_yaw(-90.0)
                .with_label("O06_Cannon_Right"),
            // Movement skills
            Placement::new(jump_pad(1500.0), 11400.0, 0.0, 0.0).with_label("O07_JumpPad"),
            Placement::new(platform(200.0, 150.0), 12000.0, 0.0, 200.0).with_label("O08_MovingPlatform_Gap"),
            Placement::new(ice(), 13500.0, 0.0, 0.0).with_label("O09_IceSurface"),
            // Combinations
            Placement::new(conveyor(350.0, true), 14500.0, 0.0, 0.0).with_label("O10_ConveyorBelt_Reverse"),
            Placement::new(pillar(150.0, 110.0), 15200.0, 0.0, 0.0).with_label("O11_RotatingPillar"),
            Placement::new(laser(3.0), 16200.0, 0.0, 0.0).with_label("O12_LaserBeam_Double1"),
            Placement::new(laser(3.0), 16700.0, 0.0, 0.0).with_label("O13_LaserBeam_Double2"),
            Placement::new(cannon(2.0), 17200.0, -350.0, 0.0)
                .with_yaw(90.0)
                .with_label("O14_Cannon_Left"),
            Placement::new(trap(1.5), 17600.0, 0.0, 0.0).with_label("O15_TrapFloor"),
            // Gauntlet
            Placement::new(ice(), 18700.0, 0.0, 0.0).with_label("O16_IceSurface"),
            Placement::new(pillar(80.0, 100.0), 18900.0, 0.0, 0.0).with_label("O17_RotatingPillar_Low"),
            Placement::new(pillar(150.0, 120.0), 19400.0, -100.0, 0.0).with_label("O18_RotatingPillar_Offset"),
            Placement::new(conveyor(500.0, false), 19800.0, 0.0, 0.0).with_label("O19_ConveyorBelt_Accel"),
            Placement::new(laser(2.0), 20200.0, 0.0, 0.0).with_label("O20_LaserBeam_Fast"),
            Placement::new(cannon(1.5), 20800.0, -350.0, 0.0)
                .with_yaw(90.0)
                .with_label("O21_Cannon_Cross_Left"),
            Placement::new(cannon(1.8), 20800.0, 350.0, 0.0)
                .with_yaw(-90.0)
                .with_label("O22_Cannon_Cross_Right"),
            Placement::new(conveyor(400.0, true), 21200.0, 0.0, 0.0).with_label("O23_ConveyorBelt_Decel"),
            // Platforming
            Placement::new(trap(1.0), 22600.0, 0.0, 0.0).with_label("O24_TrapFloor_Chain1"),
            Placement::new(trap(1.0), 22900.0, 0.0, 0.0).with_label("O25_TrapFloor_Chain2"),
            Placement::new(jump_pad(1800.0), 23400.0, 0.0, 0.0).with_label("O26_JumpPad_Final"),
            Placement::new(platform(150.0, 180.0), 23800.0, 0.0, 200.0).with_label("O27_MovingPlatform_Chain1"),
            Placement::new(platform(150.0, 200.0), 24300.0, 0.0, 200.0).with_label("O28_MovingPlatform_Chain2"),
        ];

        let floor = Floor::flat(0.0)
            .with_extent(0.0, 25500.0)
            .with_half_width(250.0)
            .with_gap(5000.0, 5300.0)
            .with_gap(11500.0, 12500.0)
            .with_gap(17450.0, 17750.0)
            .with_gap(22450.0, 23050.0)
            .with_gap(23500.0, 24700.0);

        Self {
            name: "Lvl_ObstacleLevel1".to_string(),
            floor,
            kill_z: Some(-500.0),
            obstacles,
            goal: Some(GoalPlacement {
                position: Vec3::new(25100.0, 0.0, 0.0),
                yaw: 0.0,
                goal: GoalConfig::default().with_next_level("Lvl_ObstacleLevel2"),
            }),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauntlet_core::body::{Body, Pawn};
    use gauntlet_obstacles::ObstacleKind;

    #[test]
    fn test_level_one_builds() {
        let layout = CourseLayout::level_one();
        assert_eq!(layout.obstacles.len(), 28);

        let course = layout.build().unwrap();
        assert_eq!(course.behavior_count(), 29);
        assert_eq!(course.name(), "Lvl_ObstacleLevel1");

        let cannons = course
            .behaviors()
            .filter(|(_, behavior)| behavior.kind() == ObstacleKind::Cannon)
            .count();
        assert_eq!(cannons, 5);

        let player = course.player().unwrap();
        assert_eq!(player.position(), Vec3::new(200.0, 0.0, 96.0));
        assert_eq!(player.locomotion().tuning().kill_z, Some(-500.0));
    }

    #[test]
    fn test_level_one_survives_json() {
        let layout = CourseLayout::level_one();
        let json = layout.to_json().unwrap();
        assert_eq!(CourseLayout::from_str(&json).unwrap(), layout);
    }

    #[test]
    fn test_partial_json_layout() {
        let json = r#"{
            "name": "mini",
            "floor": { "gaps": [{ "start": 1200.0, "end": 1400.0 }] },
            "obstacles": [
                { "position": [1000.0, 0.0, 0.0], "obstacle": { "type": "jump_pad", "launch_force": 1800.0 } }
            ],
            "goal": { "position": [3000.0, 0.0, 0.0] }
        }"#;
        let layout: CourseLayout = json.parse().unwrap();
        assert_eq!(layout.player, PlayerLayout::default());
        assert_eq!(layout.clips, standard_clips());
        let ObstacleConfig::JumpPad(pad) = &layout.obstacles[0].obstacle else {
            panic!("expected a jump pad");
        };
        assert_eq!(pad.launch_force, 1800.0);
        assert!(pad.override_z_velocity);

        let course = layout.build().unwrap();
        assert_eq!(course.behavior_count(), 2);
        assert_eq!(course.characters().count(), 1);
    }

    #[test]
    fn test_bad_layouts_rejected() {
        assert!(matches!(CourseLayout::from_str("{ not json"), Err(CourseError::Parse(_))));

        let mut layout = CourseLayout::default();
        layout.obstacles.push(
            Placement::new(ObstacleConfig::JumpPad(JumpPadConfig::default()), f32::NAN, 0.0, 0.0).with_label("pad"),
        );
        match layout.build() {
            Err(CourseError::InvalidObstacle { index, label, .. }) => {
                assert_eq!(index, 0);
                assert_eq!(label, "pad");
            }
            other => panic!("expected an obstacle error, got {:?}", other.map(|_| ())),
        }

        let layout = CourseLayout {
            floor: Floor::flat(0.0).with_gap(10.0, 5.0),
            ..Default::default()
        };
        assert!(matches!(layout.build(), Err(CourseError::InvalidFloor(_))));

        let missing = std::env::temp_dir().join("gauntlet_missing_layout.json");
        assert!(matches!(CourseLayout::load(&missing), Err(CourseError::Io(_))));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("gauntlet_layout_{}.json", std::process::id()));
        std::fs::write(&path, CourseLayout::level_one().to_json().unwrap()).unwrap();
        let layout = CourseLayout::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(layout.obstacles.len(), 28);
    }

    #[test]
    fn test_level_one_opening_run() {
        let mut course = CourseLayout::level_one().build().unwrap();
        for _ in 0..(3.0 * 64.0) as usize {
            course.step(1.0 / 64.0);
        }
        let player = course.player().unwrap();
        assert!(!player.is_dead());
        assert!(player.position().x > 1000.0);
        assert!(player.position().x < 2350.0);
    }
}
