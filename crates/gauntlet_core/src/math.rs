//! Gameplay math shared by locomotion, obstacles and the goal camera
//!
//! World space is Z-up with +X as an actor's forward axis, in engine units
//! (centimetres).

use glam::{Quat, Vec3};

/// Vertical component given to every knockback before renormalising
pub const KNOCKBACK_LIFT: f32 = 0.3;

/// Squared distance under which interpolation snaps to its target
const INTERP_EPSILON_SQ: f32 = 1.0e-8;

/// Outward and slightly upward unit direction from `source` towards `target`.
///
/// The horizontal offset is flattened and normalised, its Z set to
/// [`KNOCKBACK_LIFT`], then the whole vector normalised again. Coincident
/// horizontal positions push straight up.
pub fn knockback_direction(source: Vec3, target: Vec3) -> Vec3 {
    let horizontal = Vec3::new(target.x - source.x, target.y - source.y, 0.0);
    let mut direction = horizontal.normalize_or_zero();
    direction.z = KNOCKBACK_LIFT;
    direction.normalize()
}

/// Knockback velocity of magnitude `force`
pub fn knockback_velocity(source: Vec3, target: Vec3, force: f32) -> Vec3 {
    knockback_direction(source, target) * force
}

/// Frame-rate aware exponential approach of `current` towards `target`.
///
/// Moves by `(target - current) * clamp(dt * speed, 0, 1)`, so it never
/// overshoots. A non-positive speed jumps straight to the target.
pub fn interp_to(current: f32, target: f32, dt: f32, speed: f32) -> f32 {
    if speed <= 0.0 {
        return target;
    }
    let distance = target - current;
    if distance * distance < INTERP_EPSILON_SQ {
        return target;
    }
    current + distance * (dt * speed).clamp(0.0, 1.0)
}

/// Vector form of [`interp_to`]
pub fn vinterp_to(current: Vec3, target: Vec3, dt: f32, speed: f32) -> Vec3 {
    if speed <= 0.0 {
        return target;
    }
    let distance = target - current;
    if distance.length_squared() < INTERP_EPSILON_SQ {
        return target;
    }
    current + distance * (dt * speed).clamp(0.0, 1.0)
}

/// Ease in over the first half of `alpha`, ease out over the second, with
/// curve exponent `exp`.
pub fn ease_in_out(a: f32, b: f32, alpha: f32, exp: f32) -> f32 {
    let alpha = alpha.clamp(0.0, 1.0);
    let eased = if alpha < 0.5 {
        0.5 * (2.0 * alpha).powf(exp)
    } else {
        1.0 - 0.5 * (2.0 * (1.0 - alpha)).powf(exp)
    };
    a + (b - a) * eased
}

/// Offset of a point bouncing between `-distance` and `+distance` at
/// `speed`, starting at 0 and heading positive.
///
/// Period is `4 * distance / speed`. Degenerate inputs stay at 0.
pub fn triangle_wave(elapsed: f32, distance: f32, speed: f32) -> f32 {
    if distance <= 0.0 || speed <= 0.0 {
        return 0.0;
    }
    let phase = (elapsed * speed).rem_euclid(4.0 * distance);
    if phase < distance {
        phase
    } else if phase < 3.0 * distance {
        2.0 * distance - phase
    } else {
        phase - 4.0 * distance
    }
}

/// Rotation about the world up axis
#[inline]
pub fn yaw_rotation(degrees: f32) -> Quat {
    Quat::from_rotation_z(degrees.to_radians())
}

/// Yaw in degrees of a rotation's forward axis
pub fn yaw_degrees(rotation: Quat) -> f32 {
    let forward = rotation * Vec3::X;
    forward.y.atan2(forward.x).to_degrees()
}

/// Rotation that raises the forward axis by `degrees` (nose up)
#[inline]
pub fn pitch_rotation(degrees: f32) -> Quat {
    Quat::from_rotation_y(-degrees.to_radians())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_knockback_outward_and_up() {
        let dir = knockback_direction(Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0));

        assert_relative_eq!(dir.length(), 1.0, epsilon = 1e-6);
        assert!(dir.x > 0.0);
        assert_relative_eq!(dir.y, 0.0);
        // (1, 0, 0.3) renormalised
        let expected = Vec3::new(1.0, 0.0, KNOCKBACK_LIFT).normalize();
        assert_relative_eq!(dir.x, expected.x, epsilon = 1e-6);
        assert_relative_eq!(dir.z, expected.z, epsilon = 1e-6);
    }

    #[test]
    fn test_knockback_ignores_height_and_distance() {
        let near = knockback_direction(Vec3::ZERO, Vec3::new(0.0, 10.0, 500.0));
        let far = knockback_direction(Vec3::ZERO, Vec3::new(0.0, 1000.0, -50.0));
        assert_relative_eq!(near.x, far.x, epsilon = 1e-6);
        assert_relative_eq!(near.y, far.y, epsilon = 1e-6);
        assert_relative_eq!(near.z, far.z, epsilon = 1e-6);
    }

    #[test]
    fn test_knockback_straight_up_when_coincident() {
        let dir = knockback_direction(Vec3::new(5.0, 5.0, 0.0), Vec3::new(5.0, 5.0, 80.0));
        assert_relative_eq!(dir.z, 1.0, epsilon = 1e-6);
        assert_relative_eq!(knockback_velocity(Vec3::ZERO, Vec3::ZERO, 1500.0).z, 1500.0, epsilon = 1e-3);
    }

    #[test]
    fn test_interp_never_overshoots() {
        let mut value = 48.0;
        for _ in 0..200 {
            let next = interp_to(value, 96.0, 0.05, 10.0);
            assert!(next <= 96.0);
            assert!(next >= value);
            value = next;
        }
        // Huge step clamps to the target instead of passing it
        assert_eq!(interp_to(48.0, 96.0, 1.0, 50.0), 96.0);
        assert_eq!(interp_to(48.0, 96.0, 0.1, 0.0), 96.0);
    }

    #[test]
    fn test_vinterp_matches_scalar() {
        let v = vinterp_to(Vec3::ZERO, Vec3::new(0.0, 0.0, 48.0), 0.05, 10.0);
        assert_relative_eq!(v.z, interp_to(0.0, 48.0, 0.05, 10.0));
    }

    #[test]
    fn test_ease_in_out_endpoints() {
        assert_relative_eq!(ease_in_out(0.0, 1.0, 0.0, 2.0), 0.0);
        assert_relative_eq!(ease_in_out(0.0, 1.0, 0.5, 2.0), 0.5);
        assert_relative_eq!(ease_in_out(0.0, 1.0, 1.0, 2.0), 1.0);
        assert_relative_eq!(ease_in_out(0.0, 1.0, 0.25, 2.0), 0.125);
        assert_relative_eq!(ease_in_out(0.0, 1.0, 0.75, 2.0), 0.875);
    }

    #[test]
    fn test_triangle_wave_shape() {
        // distance 300, speed 200: period 6s
        assert_relative_eq!(triangle_wave(0.0, 300.0, 200.0), 0.0);
        assert_relative_eq!(triangle_wave(1.5, 300.0, 200.0), 300.0);
        assert_relative_eq!(triangle_wave(3.0, 300.0, 200.0), 0.0);
        assert_relative_eq!(triangle_wave(4.5, 300.0, 200.0), -300.0);
        assert_relative_eq!(triangle_wave(6.0, 300.0, 200.0), 0.0, epsilon = 1e-3);
        assert_eq!(triangle_wave(2.0, 0.0, 200.0), 0.0);
        assert_eq!(triangle_wave(2.0, 300.0, 0.0), 0.0);
    }

    #[test]
    fn test_rotation_helpers() {
        assert_relative_eq!(yaw_degrees(yaw_rotation(90.0)), 90.0, epsilon = 1e-4);
        let raised = pitch_rotation(45.0) * Vec3::X;
        assert_relative_eq!(raised.x, raised.z, epsilon = 1e-6);
        assert!(raised.z > 0.0);
    }
}
