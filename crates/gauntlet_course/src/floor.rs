//! Course floor: a flat strip along +X with gaps to fall through

use gauntlet_core::config::{at_least, finite, Validate};
use gauntlet_core::error::{ConfigError, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Stretch of the strip with no floor, `start < x < end`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub start: f32,
    pub end: f32,
}

impl Gap {
    /// Gap between `start` and `end`
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    fn contains(&self, x: f32) -> bool {
        x > self.start && x < self.end
    }
}

/// Floor layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Floor {
    /// Walking height
    pub height: f32,
    /// Half width across Y; `None` is unbounded
    pub half_width: Option<f32>,
    /// First X with floor; `None` is unbounded
    pub start: Option<f32>,
    /// Last X with floor; `None` is unbounded
    pub end: Option<f32>,
    /// Holes along X
    pub gaps: Vec<Gap>,
}

impl Default for Floor {
    fn default() -> Self {
        Self {
            height: 0.0,
            half_width: None,
            start: None,
            end: None,
            gaps: Vec::new(),
        }
    }
}

impl Floor {
    /// Flat unbounded floor at `height`
    pub fn flat(height: f32) -> Self {
        Self {
            height,
            ..Default::default()
        }
    }

    /// Limit the strip to `[start, end]` along X
    pub fn with_extent(mut self, start: f32, end: f32) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Limit the strip's half width
    pub fn with_half_width(mut self, half_width: f32) -> Self {
        self.half_width = Some(half_width);
        self
    }

    /// Cut a hole
    pub fn with_gap(mut self, start: f32, end: f32) -> Self {
        self.gaps.push(Gap::new(start, end));
        self
    }

    /// Floor height under `point`, if there is floor there
    pub fn height_at(&self, point: Vec3) -> Option<f32> {
        if self.start.is_some_and(|start| point.x < start) || self.end.is_some_and(|end| point.x > end) {
            return None;
        }
        if self.half_width.is_some_and(|half| point.y.abs() > half) {
            return None;
        }
        if self.gaps.iter().any(|gap| gap.contains(point.x)) {
            return None;
        }
        Some(self.height)
    }
}

impl Validate for Floor {
    fn validated(mut self) -> Result<Self> {
        self.height = finite("floor.height", self.height)?;
        if let Some(half) = self.half_width {
            self.half_width = Some(at_least("floor.half_width", half, 1.0)?);
        }
        for gap in &self.gaps {
            let start = finite("floor.gaps.start", gap.start)?;
            let end = finite("floor.gaps.end", gap.end)?;
            if end <= start {
                return Err(ConfigError::OutOfRange {
                    field: "floor.gaps.end",
                    value: end,
                    min: start,
                    max: f32::MAX,
                });
            }
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaps_and_edges() {
        let floor = Floor::flat(0.0)
            .with_extent(0.0, 1000.0)
            .with_half_width(250.0)
            .with_gap(400.0, 600.0);

        assert_eq!(floor.height_at(Vec3::new(100.0, 0.0, 50.0)), Some(0.0));
        assert_eq!(floor.height_at(Vec3::new(500.0, 0.0, 50.0)), None);
        // Gap edges still hold
        assert_eq!(floor.height_at(Vec3::new(400.0, 0.0, 50.0)), Some(0.0));
        assert_eq!(floor.height_at(Vec3::new(100.0, 300.0, 50.0)), None);
        assert_eq!(floor.height_at(Vec3::new(1200.0, 0.0, 50.0)), None);
        assert_eq!(floor.height_at(Vec3::new(-10.0, 0.0, 50.0)), None);
    }

    #[test]
    fn test_inverted_gap_rejected() {
        let floor = Floor::flat(0.0).with_gap(600.0, 400.0);
        assert!(matches!(
            floor.validated(),
            Err(ConfigError::OutOfRange { field: "floor.gaps.end", .. })
        ));
    }
}
