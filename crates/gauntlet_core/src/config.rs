//! Load-time validation helpers for tunables
//!
//! Every obstacle and ability config runs through these once when a course
//! is built. Values are never re-checked per frame.

use crate::error::{ConfigError, Result};
use glam::Vec3;

/// Types that validate (and clamp) themselves once at load time
pub trait Validate: Sized {
    /// Reject non-finite values and clamp the rest into range
    fn validated(self) -> Result<Self>;
}

/// Reject NaN and infinities
pub fn finite(field: &'static str, value: f32) -> Result<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { field })
    }
}

/// Reject non-finite components
pub fn finite_vec(field: &'static str, value: Vec3) -> Result<Vec3> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { field })
    }
}

/// Clamp a finite value into `[min, max]`, warning when it had to move
pub fn clamped(field: &'static str, value: f32, min: f32, max: f32) -> Result<f32> {
    let value = finite(field, value)?;
    let result = value.clamp(min, max);
    if result != value {
        log::warn!("{} = {} clamped to {} (range [{}, {}])", field, value, result, min, max);
    }
    Ok(result)
}

/// Clamp a finite value to at least `min`
pub fn at_least(field: &'static str, value: f32, min: f32) -> Result<f32> {
    clamped(field, value, min, f32::MAX)
}
