//! Trigger volume shapes

use gauntlet_core::Transform;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Trigger volume shapes, defined in the trigger's local frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TriggerVolume {
    /// Oriented box
    Box {
        /// Half-extents along local X, Y, Z
        half_extents: Vec3,
    },
    /// Sphere
    Sphere {
        /// Radius
        radius: f32,
    },
}

impl TriggerVolume {
    /// Create a box trigger volume from half-extents
    pub fn from_half_extents(half_extents: Vec3) -> Self {
        Self::Box { half_extents }
    }

    /// Create a sphere trigger volume
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Check if a local-space sphere touches this volume
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        match *self {
            Self::Box { half_extents } => {
                let closest = center.clamp(-half_extents, half_extents);
                (center - closest).length_squared() <= radius * radius
            }
            Self::Sphere { radius: own } => {
                let reach = own + radius;
                center.length_squared() <= reach * reach
            }
        }
    }

    /// Check if a world-space sphere touches this volume placed at `pose`
    pub fn intersects_sphere_at(&self, pose: &Transform, center: Vec3, radius: f32) -> bool {
        let local = pose.rotation.inverse() * (center - pose.translation);
        self.intersects_sphere(local, radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauntlet_core::yaw_rotation;

    #[test]
    fn test_box_touches_sphere_at_face() {
        let volume = TriggerVolume::from_half_extents(Vec3::new(150.0, 150.0, 30.0));

        // Capsule centre 96 above the box centre, radius 96: touching the top
        assert!(volume.intersects_sphere(Vec3::new(0.0, 0.0, 120.0), 96.0));
        assert!(!volume.intersects_sphere(Vec3::new(0.0, 0.0, 130.0), 96.0));
        assert!(volume.intersects_sphere(Vec3::splat(10.0), 0.0));
    }

    #[test]
    fn test_sphere_reach() {
        let sphere = TriggerVolume::sphere(1.0);
        assert!(sphere.intersects_sphere(Vec3::splat(0.5), 0.0));
        assert!(!sphere.intersects_sphere(Vec3::new(1.0, 1.0, 0.0), 0.0));
        assert!(sphere.intersects_sphere(Vec3::new(1.0, 1.0, 0.0), 0.5));
    }

    #[test]
    fn test_rotated_box() {
        // Long thin arm along local X, yawed 90 degrees so it points along +Y
        let arm = TriggerVolume::from_half_extents(Vec3::new(150.0, 20.0, 20.0));
        let pose = Transform::from_translation(Vec3::ZERO).with_rotation(yaw_rotation(90.0));

        assert!(arm.intersects_sphere_at(&pose, Vec3::new(0.0, 140.0, 0.0), 1.0));
        assert!(!arm.intersects_sphere_at(&pose, Vec3::new(140.0, 0.0, 0.0), 1.0));
    }
}
