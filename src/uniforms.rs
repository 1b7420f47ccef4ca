//! GPU-ready per-node matrices.
//!
//! The hierarchy does not render anything. [`ModelUniforms`] is the hand-off
//! format for whatever renderer consumes world matrices: it is `#[repr(C)]`
//! and [`bytemuck::Pod`], so a slice of them can be uploaded as-is with
//! [`bytemuck::cast_slice`].

use crate::math;
use glam::Mat4;

/// Uniform data for a single node.
///
/// # Memory Layout
///
/// 128 bytes, two column-major 4×4 `f32` matrices:
/// - `model` at offset 0
/// - `normal_matrix` at offset 64
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniforms {
    /// Model matrix (object to world space transformation).
    pub model: [[f32; 4]; 4],
    /// Normal matrix (inverse transpose of model matrix) for correct normal transformation.
    pub normal_matrix: [[f32; 4]; 4],
}

impl ModelUniforms {
    /// Builds uniforms from a node's world matrix.
    ///
    /// A singular world matrix (a node scaled to zero on some axis) has no
    /// inverse transpose; its rotation is used as the normal matrix instead.
    pub fn from_world_matrix(world: &Mat4, singular_epsilon: f32) -> Self {
        let normal_matrix = match math::try_inverse(world, singular_epsilon) {
            Some(inverse) => inverse.transpose(),
            None => {
                let (_, rotation, _) = math::decompose(world, f32::EPSILON);
                Mat4::from_quat(rotation)
            }
        };

        Self {
            model: world.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
        }
    }
}
