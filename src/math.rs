//! Matrix helpers the hierarchy builds on.
//!
//! `glam` supplies the vector, quaternion and matrix types. This module adds
//! the few operations whose edge cases matter for a transform hierarchy:
//!
//! - [`compose`] — scale, then rotate, then translate
//! - [`decompose`] — the inverse of [`compose`], guarded against zero-scale axes
//! - [`try_inverse`] — inversion that refuses singular matrices instead of
//!   producing `NaN`/`inf`
//! - Euler angle and look-rotation conversions
//!
//! # Conventions
//!
//! glam uses column vectors, so "apply `a` first, then `b`" is written
//! `b * a`. A child's world matrix is therefore `parent_world * local`.
//!
//! Directions follow a +Z forward, +Y up, +X right basis.

use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};

/// Unrotated forward direction.
pub const FORWARD: Vec3 = Vec3::Z;
/// Unrotated up direction.
pub const UP: Vec3 = Vec3::Y;
/// Unrotated right direction.
pub const RIGHT: Vec3 = Vec3::X;

/// Builds a matrix that scales, then rotates, then translates.
#[inline]
pub fn compose(scale: Vec3, rotation: Quat, translation: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, rotation, translation)
}

/// Splits an affine matrix into `(translation, rotation, scale)`.
///
/// Scale is the length of each basis vector, with X negated when the matrix
/// flips handedness. Basis vectors shorter than `epsilon` carry no rotation
/// information: a single degenerate axis is rebuilt from the other two, and
/// with two or more degenerate axes the rotation is identity. The result is
/// always finite for finite input.
///
/// ```
/// use tucan_transform::math::{compose, decompose};
/// use tucan_transform::{Quat, Vec3};
///
/// let m = compose(Vec3::new(0.0, 1.0, 1.0), Quat::from_rotation_y(0.5), Vec3::X);
/// let (t, r, s) = decompose(&m, 1e-6);
/// assert!(t.abs_diff_eq(Vec3::X, 1e-6));
/// assert!(r.is_finite());
/// assert_eq!(s.x, 0.0);
/// ```
pub fn decompose(m: &Mat4, epsilon: f32) -> (Vec3, Quat, Vec3) {
    let translation = m.w_axis.truncate();
    let columns = [
        m.x_axis.truncate(),
        m.y_axis.truncate(),
        m.z_axis.truncate(),
    ];
    let mut scale = Vec3::new(
        columns[0].length(),
        columns[1].length(),
        columns[2].length(),
    );

    let degenerate = [
        scale.x <= epsilon,
        scale.y <= epsilon,
        scale.z <= epsilon,
    ];
    let degenerate_count = degenerate.iter().filter(|d| **d).count();

    if degenerate_count == 0 && m.determinant() < 0.0 {
        scale.x = -scale.x;
    }

    if degenerate_count >= 2 {
        log::trace!("decompose: {degenerate_count} degenerate axes, using identity rotation");
        return (translation, Quat::IDENTITY, scale);
    }

    let mut axes = [Vec3::ZERO; 3];
    for (i, axis) in axes.iter_mut().enumerate() {
        if !degenerate[i] {
            *axis = columns[i] / scale[i];
        }
    }

    // Rebuild the missing axis so the basis stays right-handed.
    if let Some(missing) = degenerate.iter().position(|d| *d) {
        log::trace!("decompose: axis {missing} is degenerate, rebuilding from the others");
        let [x, y, z] = axes;
        axes[missing] = match missing {
            0 => y.cross(z),
            1 => z.cross(x),
            _ => x.cross(y),
        }
        .normalize_or_zero();
    }

    let rotation = Quat::from_mat3(&Mat3::from_cols(axes[0], axes[1], axes[2]));
    let rotation = if rotation.is_finite() && rotation.length_squared() > epsilon {
        rotation.normalize()
    } else {
        Quat::IDENTITY
    };

    (translation, rotation, scale)
}

/// Inverts `m`, or returns `None` when it is singular.
///
/// A matrix is singular when the magnitude of its determinant is at or below
/// `singular_epsilon`, or when inversion produces non-finite values.
pub fn try_inverse(m: &Mat4, singular_epsilon: f32) -> Option<Mat4> {
    let det = m.determinant();
    if !det.is_finite() || det.abs() <= singular_epsilon {
        return None;
    }
    let inverse = m.inverse();
    inverse.is_finite().then_some(inverse)
}

/// Converts `(pitch, yaw, roll)` Euler angles to a quaternion.
///
/// Components are radians, stored as:
///
/// - `x`: pitch, about the Y axis
/// - `y`: yaw, about the Z axis
/// - `z`: roll, about the X axis
///
/// Roll is applied first, then pitch, then yaw (`yaw * pitch * roll`).
///
/// # Example
///
/// ```
/// use tucan_transform::{math, Quat, Vec3};
///
/// let q = math::euler_to_quat(Vec3::new(0.0, 0.5, 0.0));
/// assert!(q.abs_diff_eq(Quat::from_rotation_z(0.5), 1e-6));
/// ```
#[inline]
pub fn euler_to_quat(angles: Vec3) -> Quat {
    Quat::from_euler(EulerRot::ZYX, angles.y, angles.x, angles.z)
}

/// Converts a quaternion to `(pitch, yaw, roll)` Euler angles, the inverse of
/// [`euler_to_quat`]. Pitch lies in `[-π/2, π/2]`.
#[inline]
pub fn quat_to_euler(rotation: Quat) -> Vec3 {
    let (yaw, pitch, roll) = rotation.to_euler(EulerRot::ZYX);
    Vec3::new(pitch, yaw, roll)
}

/// Returns the rotation that points [`FORWARD`] along `forward` while keeping
/// [`UP`] as close to `up` as possible.
///
/// Returns `None` if `forward` has zero length. When `forward` is parallel to
/// `up`, the shortest arc from [`FORWARD`] is used instead.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Option<Quat> {
    let f = forward.try_normalize()?;
    let Some(r) = up.cross(f).try_normalize() else {
        return Some(Quat::from_rotation_arc(FORWARD, f));
    };
    let u = f.cross(r);
    Some(Quat::from_mat3(&Mat3::from_cols(r, u, f)).normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    const EPS: f32 = 1e-5;

    #[test]
    fn decompose_recovers_translation() {
        let p = Vec3::new(1.0, -2.0, 3.5);
        let (t, r, s) = decompose(&compose(Vec3::ONE, Quat::IDENTITY, p), 1e-6);
        assert!(t.abs_diff_eq(p, EPS));
        assert!(r.abs_diff_eq(Quat::IDENTITY, EPS));
        assert!(s.abs_diff_eq(Vec3::ONE, EPS));
    }

    #[test]
    fn decompose_recovers_rotation() {
        let q = Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0).normalize(), 0.3);
        let (t, r, s) = decompose(&compose(Vec3::ONE, q, Vec3::ZERO), 1e-6);
        assert!(t.abs_diff_eq(Vec3::ZERO, EPS));
        assert!(r.abs_diff_eq(q, EPS) || r.abs_diff_eq(-q, EPS));
        assert!(s.abs_diff_eq(Vec3::ONE, EPS));
    }

    #[test]
    fn decompose_recovers_scale() {
        let scale = Vec3::new(2.0, 0.5, 3.0);
        let (t, r, s) = decompose(&compose(scale, Quat::IDENTITY, Vec3::ZERO), 1e-6);
        assert!(t.abs_diff_eq(Vec3::ZERO, EPS));
        assert!(r.abs_diff_eq(Quat::IDENTITY, EPS));
        assert!(s.abs_diff_eq(scale, EPS));
    }

    #[test]
    fn decompose_keeps_negative_scale_on_x() {
        let scale = Vec3::new(-1.0, 1.0, 1.0);
        let (_, r, s) = decompose(&compose(scale, Quat::IDENTITY, Vec3::ZERO), 1e-6);
        assert!(s.abs_diff_eq(scale, EPS));
        assert!(r.abs_diff_eq(Quat::IDENTITY, EPS));
    }

    #[test]
    fn decompose_single_zero_axis_keeps_rotation() {
        let q = Quat::from_rotation_z(FRAC_PI_2);
        let m = compose(Vec3::new(1.0, 0.0, 1.0), q, Vec3::ONE);
        let (t, r, s) = decompose(&m, 1e-6);
        assert!(t.abs_diff_eq(Vec3::ONE, EPS));
        assert!(r.is_finite());
        assert!(r.abs_diff_eq(q, EPS) || r.abs_diff_eq(-q, EPS));
        assert_eq!(s.y, 0.0);
    }

    #[test]
    fn decompose_zero_matrix_is_finite() {
        let (t, r, s) = decompose(&Mat4::ZERO, 1e-6);
        assert_eq!(t, Vec3::ZERO);
        assert_eq!(r, Quat::IDENTITY);
        assert_eq!(s, Vec3::ZERO);
    }

    #[test]
    fn inverse_rejects_singular() {
        let flat = compose(Vec3::new(1.0, 0.0, 1.0), Quat::IDENTITY, Vec3::ZERO);
        assert!(try_inverse(&flat, 1e-12).is_none());

        let m = compose(Vec3::splat(2.0), Quat::from_rotation_x(0.4), Vec3::Y);
        let inv = try_inverse(&m, 1e-12).unwrap();
        assert!((m * inv).abs_diff_eq(Mat4::IDENTITY, EPS));
    }

    #[test]
    fn euler_round_trip() {
        let angles = Vec3::new(0.3, -0.7, 1.2);
        let back = quat_to_euler(euler_to_quat(angles));
        assert!(back.abs_diff_eq(angles, EPS));
    }

    fn same_rotation(a: Quat, b: Quat) -> bool {
        a.abs_diff_eq(b, EPS) || a.abs_diff_eq(-b, EPS)
    }

    #[test]
    fn euler_components_are_pitch_yaw_roll() {
        let pitch = euler_to_quat(Vec3::new(0.5, 0.0, 0.0));
        let yaw = euler_to_quat(Vec3::new(0.0, 0.5, 0.0));
        let roll = euler_to_quat(Vec3::new(0.0, 0.0, 0.5));
        assert!(same_rotation(pitch, Quat::from_rotation_y(0.5)));
        assert!(same_rotation(yaw, Quat::from_rotation_z(0.5)));
        assert!(same_rotation(roll, Quat::from_rotation_x(0.5)));

        let about_y = quat_to_euler(Quat::from_rotation_y(0.5));
        let about_z = quat_to_euler(Quat::from_rotation_z(0.5));
        let about_x = quat_to_euler(Quat::from_rotation_x(0.5));
        assert!(about_y.abs_diff_eq(Vec3::new(0.5, 0.0, 0.0), EPS));
        assert!(about_z.abs_diff_eq(Vec3::new(0.0, 0.5, 0.0), EPS));
        assert!(about_x.abs_diff_eq(Vec3::new(0.0, 0.0, 0.5), EPS));
    }

    #[test]
    fn euler_applies_roll_then_pitch_then_yaw() {
        let q = euler_to_quat(Vec3::new(FRAC_PI_4, FRAC_PI_2, FRAC_PI_2));
        let expected = Quat::from_rotation_z(FRAC_PI_2)
            * Quat::from_rotation_y(FRAC_PI_4)
            * Quat::from_rotation_x(FRAC_PI_2);
        assert!(same_rotation(q, expected));
    }

    #[test]
    fn look_rotation_points_forward() {
        let dir = Vec3::new(1.0, 0.0, 1.0).normalize();
        let q = look_rotation(dir, UP).unwrap();
        assert!((q * FORWARD).abs_diff_eq(dir, EPS));
        assert!((q * UP).abs_diff_eq(UP, EPS));

        assert!(look_rotation(Vec3::ZERO, UP).is_none());

        let straight_up = look_rotation(UP, UP).unwrap();
        assert!((straight_up * FORWARD).abs_diff_eq(UP, EPS));
    }
}
