//! Configuration errors

use thiserror::Error;

/// Errors raised while validating tunables at load time
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A value was NaN or infinite
    #[error("{field} must be a finite number")]
    NonFinite {
        /// Offending field
        field: &'static str,
    },

    /// A value fell outside a range that cannot be clamped meaningfully
    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        /// Offending field
        field: &'static str,
        /// Supplied value
        value: f32,
        /// Lower bound
        min: f32,
        /// Upper bound
        max: f32,
    },

    /// A required value was absent
    #[error("missing required value: {0}")]
    Missing(&'static str),
}

/// Result type for configuration validation
pub type Result<T> = std::result::Result<T, ConfigError>;
