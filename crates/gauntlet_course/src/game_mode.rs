//! Game mode: keeps player characters running forward

use crate::character::Character;
use gauntlet_core::body::{Body, Pawn};
use gauntlet_core::config::{clamped, Validate};
use gauntlet_core::error::Result;
use gauntlet_core::math::{yaw_degrees, yaw_rotation};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Game mode settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameModeConfig {
    /// Push every live player forward each frame
    pub auto_run_enabled: bool,
    /// Forward input strength; `None` turns auto-run off
    pub auto_run_input_scale: Option<f32>,
}

impl Default for GameModeConfig {
    fn default() -> Self {
        Self {
            auto_run_enabled: true,
            auto_run_input_scale: Some(1.0),
        }
    }
}

impl GameModeConfig {
    /// No auto-run
    pub fn manual() -> Self {
        Self {
            auto_run_enabled: false,
            ..Default::default()
        }
    }
}

impl Validate for GameModeConfig {
    fn validated(mut self) -> Result<Self> {
        if let Some(scale) = self.auto_run_input_scale {
            self.auto_run_input_scale = Some(clamped("auto_run_input_scale", scale, -1.0, 1.0)?);
        }
        Ok(self)
    }
}

/// Per-frame rules applied to the characters
#[derive(Debug, Clone)]
pub struct GameMode {
    auto_run_scale: Option<f32>,
}

impl GameMode {
    pub fn new(config: &GameModeConfig) -> Self {
        let auto_run_scale = match (config.auto_run_enabled, config.auto_run_input_scale) {
            (true, Some(scale)) => Some(scale),
            (true, None) => {
                log::warn!("auto-run is enabled without an input scale, disabling it");
                None
            }
            (false, _) => None,
        };
        Self { auto_run_scale }
    }

    /// Whether auto-run drives the players
    pub fn is_auto_running(&self) -> bool {
        self.auto_run_scale.is_some()
    }

    /// Feed this frame's input to a character
    pub fn drive(&self, character: &mut Character) {
        let Some(scale) = self.auto_run_scale else {
            return;
        };
        if !character.is_player_controlled() || character.is_dead() {
            return;
        }
        // Forward on the ground plane, whatever the body's pitch
        let forward = yaw_rotation(yaw_degrees(character.rotation())) * Vec3::X;
        character.set_move_input(forward * scale);
    }
}

impl Default for GameMode {
    fn default() -> Self {
        Self::new(&GameModeConfig::default())
    }
}
