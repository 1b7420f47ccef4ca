//! Per-node transform state.

use crate::math;
use crate::transform::Transform;
use glam::{Mat4, Quat, Vec3};
use hecs::Entity;

/// The transform component stored on every node of a
/// [`TransformHierarchy`](crate::TransformHierarchy).
///
/// A node holds two views of the same pose:
///
/// - **local** — position, orientation and scale relative to the parent
///   (or to the world, for a root). These are authoritative.
/// - **world** — the same pose in the root frame, derived from the local
///   values and the parent's world matrix.
///
/// Both matrices are cached and kept up to date by every mutation, so reading
/// them is free. Nodes are read-only from outside the crate; all edits go
/// through the hierarchy, which keeps parent and child links in sync.
#[derive(Clone, Debug)]
pub struct TransformNode {
    pub(crate) local_position: Vec3,
    pub(crate) local_orientation: Quat,
    pub(crate) local_scale: Vec3,

    pub(crate) world_position: Vec3,
    pub(crate) world_orientation: Quat,
    pub(crate) world_scale: Vec3,

    pub(crate) local_matrix: Mat4,
    pub(crate) world_matrix: Mat4,

    pub(crate) parent: Option<Entity>,
    pub(crate) children: Vec<Entity>,
}

impl TransformNode {
    /// Identity transforms, no parent, no children.
    pub(crate) fn detached() -> Self {
        Self {
            local_position: Vec3::ZERO,
            local_orientation: Quat::IDENTITY,
            local_scale: Vec3::ONE,
            world_position: Vec3::ZERO,
            world_orientation: Quat::IDENTITY,
            world_scale: Vec3::ONE,
            local_matrix: Mat4::IDENTITY,
            world_matrix: Mat4::IDENTITY,
            parent: None,
            children: Vec::new(),
        }
    }

    /// A detached node with the given local transform, already consistent
    /// with having no parent.
    pub(crate) fn from_local(local: Transform, epsilon: f32) -> Self {
        let mut node = Self {
            local_position: local.position,
            local_orientation: local.rotation,
            local_scale: local.scale,
            ..Self::detached()
        };
        node.refresh_from_local(&Mat4::IDENTITY, epsilon);
        node
    }

    /// Rebuilds the local matrix, then the world matrix and world fields,
    /// against the given parent world matrix. Does not touch children.
    pub(crate) fn refresh_from_local(&mut self, parent_world: &Mat4, epsilon: f32) {
        self.local_matrix = math::compose(
            self.local_scale,
            self.local_orientation,
            self.local_position,
        );
        self.world_matrix = *parent_world * self.local_matrix;

        let (position, orientation, scale) = math::decompose(&self.world_matrix, epsilon);
        self.world_position = position;
        self.world_orientation = orientation;
        self.world_scale = scale;
    }

    /// Derives local fields from the current world fields and the inverse of
    /// the parent world matrix.
    pub(crate) fn derive_local_from_world(&mut self, parent_world_inverse: &Mat4, epsilon: f32) {
        let requested = math::compose(
            self.world_scale,
            self.world_orientation,
            self.world_position,
        );
        let raw_local = *parent_world_inverse * requested;

        let (position, orientation, scale) = math::decompose(&raw_local, epsilon);
        self.local_position = position;
        self.local_orientation = orientation;
        self.local_scale = scale;
    }

    /// Position relative to the parent.
    pub fn local_position(&self) -> Vec3 {
        self.local_position
    }

    /// Orientation relative to the parent.
    pub fn local_orientation(&self) -> Quat {
        self.local_orientation
    }

    /// Scale relative to the parent.
    pub fn local_scale(&self) -> Vec3 {
        self.local_scale
    }

    /// Position in the root frame.
    pub fn world_position(&self) -> Vec3 {
        self.world_position
    }

    /// Orientation in the root frame.
    pub fn world_orientation(&self) -> Quat {
        self.world_orientation
    }

    /// Scale in the root frame, decomposed from the world matrix.
    pub fn world_scale(&self) -> Vec3 {
        self.world_scale
    }

    /// Local pose as a detached [`Transform`].
    pub fn local(&self) -> Transform {
        Transform {
            position: self.local_position,
            rotation: self.local_orientation,
            scale: self.local_scale,
        }
    }

    /// World pose as a detached [`Transform`].
    pub fn world(&self) -> Transform {
        Transform {
            position: self.world_position,
            rotation: self.world_orientation,
            scale: self.world_scale,
        }
    }

    /// Cached `scale · rotate · translate` of the local fields.
    pub fn local_matrix(&self) -> Mat4 {
        self.local_matrix
    }

    /// Cached local matrix followed by the parent's world matrix.
    pub fn world_matrix(&self) -> Mat4 {
        self.world_matrix
    }

    /// Local orientation as Euler angles, see [`math::quat_to_euler`].
    pub fn local_euler_angles(&self) -> Vec3 {
        math::quat_to_euler(self.local_orientation)
    }

    /// World orientation as Euler angles, see [`math::quat_to_euler`].
    pub fn world_euler_angles(&self) -> Vec3 {
        math::quat_to_euler(self.world_orientation)
    }

    /// World-space forward (+Z) direction.
    pub fn forward(&self) -> Vec3 {
        self.world_orientation * math::FORWARD
    }

    /// World-space up (+Y) direction.
    pub fn up(&self) -> Vec3 {
        self.world_orientation * math::UP
    }

    /// World-space right (+X) direction.
    pub fn right(&self) -> Vec3 {
        self.world_orientation * math::RIGHT
    }

    /// Parent handle, `None` for a root.
    pub fn parent(&self) -> Option<Entity> {
        self.parent
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[Entity] {
        &self.children
    }

    /// Number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Whether the node has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
