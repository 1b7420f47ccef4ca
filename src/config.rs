//! Numeric tolerances and default policies for a hierarchy.

/// Configuration for a [`TransformHierarchy`](crate::TransformHierarchy).
///
/// Uses the same builder style as the rest of the crate:
///
/// ```
/// use tucan_transform::{HierarchyConfig, TransformHierarchy};
///
/// let config = HierarchyConfig::new()
///     .decompose_epsilon(1e-5)
///     .keep_world_transform(false);
/// let hierarchy = TransformHierarchy::with_config(config);
/// assert!(!hierarchy.config().keep_world_transform);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HierarchyConfig {
    /// Basis vectors shorter than this are treated as degenerate when
    /// decomposing a matrix into translation, rotation and scale.
    pub decompose_epsilon: f32,
    /// Matrices whose determinant magnitude is at or below this value are
    /// considered singular and are never inverted.
    pub singular_epsilon: f32,
    /// Reparent policy used by `add_child`, `remove_child` and non-recursive
    /// `despawn`. `true` keeps nodes fixed in world space.
    pub keep_world_transform: bool,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            decompose_epsilon: 1e-6,
            singular_epsilon: 1e-12,
            keep_world_transform: true,
        }
    }
}

impl HierarchyConfig {
    /// Same as [`HierarchyConfig::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the length below which a basis vector counts as degenerate during
    /// decomposition. Default `1e-6`.
    pub fn decompose_epsilon(mut self, epsilon: f32) -> Self {
        self.decompose_epsilon = epsilon;
        self
    }

    /// Set the determinant magnitude at or below which a matrix is treated
    /// as singular. Default `1e-12`.
    pub fn singular_epsilon(mut self, epsilon: f32) -> Self {
        self.singular_epsilon = epsilon;
        self
    }

    /// Set the reparent policy used by `add_child`, `remove_child` and
    /// non-recursive `despawn`. Default `true`.
    ///
    /// # Example
    ///
    /// ```
    /// use tucan_transform::{HierarchyConfig, Transform, TransformHierarchy, Vec3};
    ///
    /// let config = HierarchyConfig::new().keep_world_transform(false);
    /// let mut hierarchy = TransformHierarchy::with_config(config);
    /// let parent = hierarchy.spawn_with_transform(Transform::from_position(Vec3::X));
    /// let child = hierarchy.spawn_with_transform(Transform::from_position(Vec3::Y));
    ///
    /// // Local values are kept, so the child moves with its new parent.
    /// hierarchy.add_child(parent, child)?;
    /// assert!(hierarchy.world(child)?.position.abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-6));
    /// # Ok::<(), tucan_transform::HierarchyError>(())
    /// ```
    pub fn keep_world_transform(mut self, keep: bool) -> Self {
        self.keep_world_transform = keep;
        self
    }
}
