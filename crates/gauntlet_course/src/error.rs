//! Error types for the course runtime

use gauntlet_core::error::ConfigError;
use gauntlet_core::id::EntityId;
use thiserror::Error;

/// Course runtime errors
#[derive(Debug, Error)]
pub enum CourseError {
    /// Layout file could not be read
    #[error("Failed to read course layout: {0}")]
    Io(#[from] std::io::Error),

    /// Layout file is not valid JSON for a course
    #[error("Failed to parse course layout: {0}")]
    Parse(#[from] serde_json::Error),

    /// An obstacle placement carries bad tunables
    #[error("Obstacle #{index} ({label}) is misconfigured: {source}")]
    InvalidObstacle {
        index: usize,
        label: String,
        #[source]
        source: ConfigError,
    },

    /// Player spawn or movement settings are bad
    #[error("Invalid player settings: {0}")]
    InvalidPlayer(#[source] ConfigError),

    /// Goal tunables are bad
    #[error("Invalid goal settings: {0}")]
    InvalidGoal(#[source] ConfigError),

    /// Floor layout is bad
    #[error("Invalid floor: {0}")]
    InvalidFloor(#[source] ConfigError),

    /// No live entity with this handle
    #[error("Unknown entity: {0}")]
    UnknownEntity(EntityId),
}

/// Result type for course operations
pub type Result<T> = std::result::Result<T, CourseError>;
