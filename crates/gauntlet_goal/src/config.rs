//! Goal tunables

use gauntlet_core::config::{at_least, clamped, finite_vec, Validate};
use gauntlet_core::error::Result;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Camera orbit played before the level changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitSequence {
    /// Seconds for one full turn
    pub orbit_duration: f32,
    /// Boom length during the orbit
    pub orbit_radius: f32,
    /// Fixed boom pitch in degrees
    pub orbit_pitch: f32,
}

impl Default for OrbitSequence {
    fn default() -> Self {
        Self {
            orbit_duration: 4.0,
            orbit_radius: 600.0,
            orbit_pitch: -20.0,
        }
    }
}

/// Plain wait before the level changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelaySequence {
    /// Seconds to wait
    pub transition_delay: f32,
}

impl Default for DelaySequence {
    fn default() -> Self {
        Self { transition_delay: 3.0 }
    }
}

/// What happens between reaching the goal and the level change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum GoalSequence {
    Orbit(OrbitSequence),
    Delay(DelaySequence),
}

impl Default for GoalSequence {
    fn default() -> Self {
        Self::Orbit(OrbitSequence::default())
    }
}

/// Goal volume tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalConfig {
    /// Level requested at the end; `None` only warns
    pub next_level: Option<String>,
    /// Celebration before the transition
    pub sequence: GoalSequence,
    /// Half-extents of the finish box, resting on the root
    pub half_extents: Vec3,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            next_level: None,
            sequence: GoalSequence::default(),
            half_extents: Vec3::new(100.0, 250.0, 200.0),
        }
    }
}

impl GoalConfig {
    /// Request `level` once the sequence ends
    pub fn with_next_level(mut self, level: impl Into<String>) -> Self {
        self.next_level = Some(level.into());
        self
    }

    /// Wait `seconds` instead of orbiting
    pub fn with_delay(mut self, seconds: f32) -> Self {
        self.sequence = GoalSequence::Delay(DelaySequence {
            transition_delay: seconds,
        });
        self
    }

    /// Orbit for `seconds`
    pub fn with_orbit_duration(mut self, seconds: f32) -> Self {
        self.sequence = GoalSequence::Orbit(OrbitSequence {
            orbit_duration: seconds,
            ..Default::default()
        });
        self
    }
}

impl Validate for GoalConfig {
    fn validated(mut self) -> Result<Self> {
        if self.next_level.as_deref().is_some_and(|name| name.trim().is_empty()) {
            log::warn!("goal next_level is blank, treating it as unset");
            self.next_level = None;
        }
        self.sequence = match self.sequence {
            GoalSequence::Orbit(orbit) => GoalSequence::Orbit(OrbitSequence {
                orbit_duration: at_least("orbit_duration", orbit.orbit_duration, 0.1)?,
                orbit_radius: at_least("orbit_radius", orbit.orbit_radius, 0.0)?,
                orbit_pitch: clamped("orbit_pitch", orbit.orbit_pitch, -89.0, 89.0)?,
            }),
            GoalSequence::Delay(delay) => GoalSequence::Delay(DelaySequence {
                transition_delay: at_least("transition_delay", delay.transition_delay, 0.0)?,
            }),
        };
        self.half_extents = finite_vec("half_extents", self.half_extents)?.abs();
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json() {
        let config: GoalConfig =
            serde_json::from_str(r#"{"next_level": "Level_02", "sequence": {"mode": "delay"}}"#).unwrap();
        assert_eq!(config.next_level.as_deref(), Some("Level_02"));
        assert_eq!(config.sequence, GoalSequence::Delay(DelaySequence::default()));

        let config: GoalConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, GoalConfig::default());
    }

    #[test]
    fn test_validation() {
        let config = GoalConfig {
            next_level: Some("  ".to_string()),
            sequence: GoalSequence::Orbit(OrbitSequence {
                orbit_duration: 0.0,
                orbit_pitch: -120.0,
                ..Default::default()
            }),
            ..Default::default()
        }
        .validated()
        .unwrap();

        assert_eq!(config.next_level, None);
        let GoalSequence::Orbit(orbit) = config.sequence else {
            panic!("expected an orbit");
        };
        assert_eq!(orbit.orbit_duration, 0.1);
        assert_eq!(orbit.orbit_pitch, -89.0);

        assert!(GoalConfig::default().with_delay(f32::INFINITY).validated().is_err());
    }
}
