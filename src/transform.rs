//! Plain position/rotation/scale values.

use crate::math;
use glam::{Mat4, Quat, Vec3};

/// A position, rotation, and scale triple.
///
/// `Transform` is a detached value: it is what you hand to
/// [`TransformHierarchy::spawn_with_transform`](crate::TransformHierarchy::spawn_with_transform)
/// or [`TransformHierarchy::set_local_transform`](crate::TransformHierarchy::set_local_transform),
/// and what [`TransformNode::local`](crate::TransformNode::local) and
/// [`TransformNode::world`](crate::TransformNode::world) give back.
///
/// # Builder Pattern
///
/// ```
/// use tucan_transform::{Transform, Vec3, Quat};
///
/// let transform = Transform::new()
///     .position(Vec3::new(0.0, 5.0, -10.0))
///     .rotation(Quat::from_rotation_y(std::f32::consts::PI / 4.0))
///     .uniform_scale(2.0);
/// ```
///
/// # Transformation Order
///
/// [`Transform::matrix()`] applies **Scale → Rotate → Translate** (SRT):
/// 1. Scale around the local origin
/// 2. Rotate around the local origin
/// 3. Translate into the parent frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Translation.
    pub position: Vec3,
    /// Rotation as a unit quaternion.
    pub rotation: Quat,
    /// Scale factors for each axis.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// Origin, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Creates a new identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transform positioned at the given location.
    ///
    /// ```
    /// use tucan_transform::{Transform, Vec3};
    ///
    /// let transform = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
    /// assert_eq!(transform.position, Vec3::new(1.0, 2.0, 3.0));
    /// ```
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Splits a matrix back into its components.
    ///
    /// See [`math::decompose`] for how degenerate axes are handled.
    pub fn from_matrix(matrix: &Mat4, epsilon: f32) -> Self {
        let (position, rotation, scale) = math::decompose(matrix, epsilon);
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Sets the position component.
    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Sets the rotation component.
    pub fn rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Sets the rotation from `(pitch, yaw, roll)` Euler angles in radians:
    /// pitch about Y, yaw about Z, roll about X.
    ///
    /// See [`math::euler_to_quat`] for the rotation order.
    pub fn euler_angles(mut self, angles: Vec3) -> Self {
        self.rotation = math::euler_to_quat(angles);
        self
    }

    /// Sets non-uniform scale factors for each axis.
    pub fn scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Sets uniform scale on all axes.
    ///
    /// ```
    /// use tucan_transform::{Transform, Vec3};
    ///
    /// let transform = Transform::new().uniform_scale(2.0);
    /// assert_eq!(transform.scale, Vec3::new(2.0, 2.0, 2.0));
    /// ```
    pub fn uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Converts this transform to a 4×4 matrix in SRT order.
    pub fn matrix(&self) -> Mat4 {
        math::compose(self.scale, self.rotation, self.position)
    }

    /// Whether every component is within `max_abs_diff` of `other`.
    ///
    /// Rotations `q` and `-q` describe the same orientation and compare equal.
    pub fn abs_diff_eq(&self, other: &Self, max_abs_diff: f32) -> bool {
        self.position.abs_diff_eq(other.position, max_abs_diff)
            && self.scale.abs_diff_eq(other.scale, max_abs_diff)
            && (self.rotation.abs_diff_eq(other.rotation, max_abs_diff)
                || self.rotation.abs_diff_eq(-other.rotation, max_abs_diff))
    }
}
