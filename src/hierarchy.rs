//! The transform hierarchy: an arena of [`TransformNode`]s linked into a tree.
//!
//! Nodes live in a [`hecs::World`] and are addressed by [`hecs::Entity`]
//! handles. Handles are generational, so a handle to a despawned node fails
//! with [`HierarchyError::NoSuchNode`] instead of aliasing a newer node.
//!
//! # Consistency
//!
//! After every public call returns, each node satisfies:
//!
//! - `local_matrix == compose(local_scale, local_orientation, local_position)`
//! - `world_matrix == parent.world_matrix * local_matrix` (just `local_matrix`
//!   for roots), i.e. the local transform is applied first, then the parent's
//! - the world fields are the decomposition of `world_matrix`
//! - `child` is in `parent.children` exactly when `child.parent == parent`
//! - no node is its own ancestor
//!
//! Every setter cascades eagerly: changing a node recomputes its whole
//! subtree, depth-first, before returning. Calls that fail validate first
//! and leave the hierarchy untouched.
//!
//! # Example
//!
//! ```
//! use tucan_transform::{TransformHierarchy, Transform, Vec3};
//!
//! let mut hierarchy = TransformHierarchy::new();
//! let ship = hierarchy.spawn_with_transform(Transform::from_position(Vec3::new(10.0, 0.0, 0.0)));
//! let turret = hierarchy.spawn_with_transform(Transform::from_position(Vec3::new(0.0, 1.0, 0.0)));
//!
//! // Attach without keeping the world pose: the turret's local offset is
//! // now measured from the ship.
//! hierarchy.set_parent(turret, Some(ship), false)?;
//! assert_eq!(hierarchy.world(turret)?.position, Vec3::new(10.0, 1.0, 0.0));
//!
//! // Moving the ship carries the turret along.
//! hierarchy.set_local_position(ship, Vec3::ZERO)?;
//! assert_eq!(hierarchy.world(turret)?.position, Vec3::new(0.0, 1.0, 0.0));
//! # Ok::<(), tucan_transform::HierarchyError>(())
//! ```

use crate::config::HierarchyConfig;
use crate::error::{HierarchyError, Result};
use crate::math;
use crate::node::TransformNode;
use crate::transform::Transform;
use crate::uniforms::ModelUniforms;
use glam::{Mat4, Quat, Vec3};
use hecs::{Component, DynamicBundle, Entity, EntityBuilder, World};

/// An arena of transform nodes kept consistent under edits and reparenting.
pub struct TransformHierarchy {
    world: World,
    config: HierarchyConfig,
}

impl Default for TransformHierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformHierarchy {
    /// Create an empty hierarchy with the default configuration.
    pub fn new() -> Self {
        Self::with_config(HierarchyConfig::default())
    }

    /// Create an empty hierarchy with custom tolerances and reparent policy.
    pub fn with_config(config: HierarchyConfig) -> Self {
        Self {
            world: World::new(),
            config,
        }
    }

    /// Tolerances and reparent policy this hierarchy was built with.
    pub fn config(&self) -> &HierarchyConfig {
        &self.config
    }

    /// Borrow a component attached with [`spawn_with`](Self::spawn_with).
    ///
    /// Returns `None` if the node is dead or has no such component. The
    /// borrow is shared only; nothing attached to a node can be edited from
    /// outside, which keeps parent and child links under the hierarchy's
    /// control.
    ///
    /// ```
    /// use tucan_transform::{TransformHierarchy, Transform};
    ///
    /// struct Health(u32);
    ///
    /// let mut hierarchy = TransformHierarchy::new();
    /// let crate_node = hierarchy.spawn_with(Transform::new(), (Health(3),));
    /// assert_eq!(hierarchy.component::<Health>(crate_node).unwrap().0, 3);
    /// assert!(hierarchy.component::<String>(crate_node).is_none());
    /// ```
    ///
    /// Transform nodes come back read-only like any other component:
    ///
    /// ```compile_fail
    /// use tucan_transform::{TransformHierarchy, TransformNode};
    ///
    /// let mut hierarchy = TransformHierarchy::new();
    /// let a = hierarchy.spawn();
    /// let copy = TransformNode::clone(&hierarchy.node(a).unwrap());
    /// *hierarchy.component::<TransformNode>(a).unwrap() = copy;
    /// ```
    pub fn component<T: Component>(&self, node: Entity) -> Option<hecs::Ref<'_, T>> {
        self.world.get::<&T>(node).ok()
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Spawn a root node with identity transforms.
    pub fn spawn(&mut self) -> Entity {
        self.spawn_with_transform(Transform::IDENTITY)
    }

    /// Spawn a root node with the given local (and therefore world) transform.
    pub fn spawn_with_transform(&mut self, local: Transform) -> Entity {
        self.spawn_with(local, ())
    }

    /// Spawn a root node carrying extra components.
    ///
    /// ```
    /// use tucan_transform::{TransformHierarchy, Transform};
    ///
    /// struct Name(&'static str);
    ///
    /// let mut hierarchy = TransformHierarchy::new();
    /// let sun = hierarchy.spawn_with(Transform::new(), (Name("sun"),));
    /// let name = hierarchy.component::<Name>(sun).unwrap();
    /// assert_eq!(name.0, "sun");
    /// ```
    pub fn spawn_with(&mut self, local: Transform, components: impl DynamicBundle) -> Entity {
        let mut builder = EntityBuilder::new();
        builder.add_bundle(components);
        // Added last so a node smuggled in through the bundle is replaced.
        builder.add(TransformNode::from_local(local, self.config.decompose_epsilon));
        let entity = self.world.spawn(builder.build());
        log::trace!("spawned node {entity:?}");
        entity
    }

    /// Destroy a node.
    ///
    /// The node is first detached from its parent. Its children are then
    /// either despawned along with it (`recursive = true`) or detached to
    /// become roots, using the configured
    /// [`keep_world_transform`](HierarchyConfig::keep_world_transform) policy.
    pub fn despawn(&mut self, node: Entity, recursive: bool) -> Result<()> {
        let (parent, children) = {
            let n = self.node(node)?;
            (n.parent, n.children.clone())
        };

        if recursive {
            let doomed = self.descendants(node)?;
            for entity in &doomed {
                self.world
                    .despawn(*entity)
                    .map_err(|_| HierarchyError::NoSuchNode(*entity))?;
            }
            log::debug!("despawned {node:?} and {} descendants", doomed.len());
        } else {
            let keep_world = self.config.keep_world_transform;
            for child in children {
                self.set_parent(child, None, keep_world)?;
            }
            log::debug!("despawned {node:?}, children detached");
        }

        if let Some(parent) = parent {
            self.unlink_child(parent, node);
        }
        self.world
            .despawn(node)
            .map_err(|_| HierarchyError::NoSuchNode(node))
    }

    /// Whether `node` is a live node of this hierarchy.
    pub fn contains(&self, node: Entity) -> bool {
        self.node(node).is_ok()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.world.query::<&TransformNode>().iter().count()
    }

    /// Whether the hierarchy has no live nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ---------------------------------------------------------------------
    // Reading
    // ---------------------------------------------------------------------

    /// Borrow a node's full state.
    pub fn node(&self, node: Entity) -> Result<hecs::Ref<'_, TransformNode>> {
        self.world
            .get::<&TransformNode>(node)
            .map_err(|_| HierarchyError::NoSuchNode(node))
    }

    /// The node's local pose.
    pub fn local(&self, node: Entity) -> Result<Transform> {
        Ok(self.node(node)?.local())
    }

    /// The node's world pose.
    pub fn world(&self, node: Entity) -> Result<Transform> {
        Ok(self.node(node)?.world())
    }

    /// Cached local matrix. Never recomputes.
    pub fn local_matrix(&self, node: Entity) -> Result<Mat4> {
        Ok(self.node(node)?.local_matrix)
    }

    /// Cached world matrix. Never recomputes.
    pub fn world_matrix(&self, node: Entity) -> Result<Mat4> {
        Ok(self.node(node)?.world_matrix)
    }

    /// Local orientation as `(pitch, yaw, roll)`, see [`math::quat_to_euler`].
    pub fn local_euler_angles(&self, node: Entity) -> Result<Vec3> {
        Ok(self.node(node)?.local_euler_angles())
    }

    /// World orientation as `(pitch, yaw, roll)`, see [`math::quat_to_euler`].
    pub fn world_euler_angles(&self, node: Entity) -> Result<Vec3> {
        Ok(self.node(node)?.world_euler_angles())
    }

    /// World-space forward direction: the node's +Z axis, unit length.
    ///
    /// # Example
    ///
    /// ```
    /// use std::f32::consts::FRAC_PI_2;
    /// use tucan_transform::{Quat, TransformHierarchy, Vec3};
    ///
    /// let mut hierarchy = TransformHierarchy::new();
    /// let node = hierarchy.spawn();
    /// hierarchy.set_world_orientation(node, Quat::from_rotation_y(FRAC_PI_2))?;
    /// assert!(hierarchy.forward(node)?.abs_diff_eq(Vec3::X, 1e-6));
    /// # Ok::<(), tucan_transform::HierarchyError>(())
    /// ```
    pub fn forward(&self, node: Entity) -> Result<Vec3> {
        Ok(self.node(node)?.forward())
    }

    /// World-space up direction: the node's +Y axis.
    pub fn up(&self, node: Entity) -> Result<Vec3> {
        Ok(self.node(node)?.up())
    }

    /// World-space right direction: the node's +X axis.
    pub fn right(&self, node: Entity) -> Result<Vec3> {
        Ok(self.node(node)?.right())
    }

    /// Map a point from the node's local space into world space.
    pub fn transform_point(&self, node: Entity, point: Vec3) -> Result<Vec3> {
        Ok(self.node(node)?.world_matrix.transform_point3(point))
    }

    /// Map a world-space point into the node's local space.
    pub fn inverse_transform_point(&self, node: Entity, point: Vec3) -> Result<Vec3> {
        let world_matrix = self.world_matrix(node)?;
        let inverse = math::try_inverse(&world_matrix, self.config.singular_epsilon)
            .ok_or(HierarchyError::NonInvertibleTransform { node })?;
        Ok(inverse.transform_point3(point))
    }

    // ---------------------------------------------------------------------
    // Navigation
    // ---------------------------------------------------------------------

    /// The node's parent, or `None` for a root.
    pub fn parent(&self, node: Entity) -> Result<Option<Entity>> {
        Ok(self.node(node)?.parent)
    }

    /// Number of direct children.
    pub fn child_count(&self, node: Entity) -> Result<usize> {
        Ok(self.node(node)?.children.len())
    }

    /// The `index`-th child, in insertion order.
    pub fn child(&self, node: Entity, index: usize) -> Result<Entity> {
        let n = self.node(node)?;
        n.children
            .get(index)
            .copied()
            .ok_or(HierarchyError::ChildIndexOutOfRange {
                node,
                index,
                len: n.children.len(),
            })
    }

    /// Direct children in insertion order.
    ///
    /// # Example
    ///
    /// ```
    /// use tucan_transform::TransformHierarchy;
    ///
    /// let mut hierarchy = TransformHierarchy::new();
    /// let (parent, a, b) = (hierarchy.spawn(), hierarchy.spawn(), hierarchy.spawn());
    /// hierarchy.add_child(parent, a)?;
    /// hierarchy.add_child(parent, b)?;
    /// assert_eq!(hierarchy.children(parent)?, vec![a, b]);
    /// assert_eq!(hierarchy.child_count(parent)?, 2);
    /// # Ok::<(), tucan_transform::HierarchyError>(())
    /// ```
    pub fn children(&self, node: Entity) -> Result<Vec<Entity>> {
        Ok(self.node(node)?.children.clone())
    }

    /// All parentless nodes, sorted by handle index.
    ///
    /// Indices of despawned nodes are reused, so this is not spawn order.
    pub fn roots(&self) -> Vec<Entity> {
        let mut roots: Vec<Entity> = self
            .world
            .query::<&TransformNode>()
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(entity, _)| entity)
            .collect();
        roots.sort_by_key(|entity| entity.id());
        roots
    }

    /// Every node below `node`, depth-first pre-order, not including `node`.
    pub fn descendants(&self, node: Entity) -> Result<Vec<Entity>> {
        let mut out = Vec::new();
        let mut stack: Vec<Entity> = self.node(node)?.children.iter().rev().copied().collect();
        while let Some(entity) = stack.pop() {
            out.push(entity);
            stack.extend(self.node(entity)?.children.iter().rev().copied());
        }
        Ok(out)
    }

    /// Parent, grandparent, and so on up to the root.
    pub fn ancestors(&self, node: Entity) -> Result<Vec<Entity>> {
        let mut out = Vec::new();
        let mut current = self.node(node)?.parent;
        while let Some(entity) = current {
            out.push(entity);
            current = self.node(entity)?.parent;
        }
        Ok(out)
    }

    /// Whether `ancestor` appears on the parent chain of `node`.
    pub fn is_ancestor_of(&self, ancestor: Entity, node: Entity) -> Result<bool> {
        let mut current = self.node(node)?.parent;
        while let Some(entity) = current {
            if entity == ancestor {
                return Ok(true);
            }
            current = self.node(entity)?.parent;
        }
        Ok(false)
    }

    // ---------------------------------------------------------------------
    // Local-space edits
    // ---------------------------------------------------------------------

    pub fn set_local_position(&mut self, node: Entity, position: Vec3) -> Result<()> {
        self.edit_local(node, |n| n.local_position = position)
    }

    pub fn set_local_orientation(&mut self, node: Entity, orientation: Quat) -> Result<()> {
        self.edit_local(node, |n| n.local_orientation = orientation)
    }

    pub fn set_local_scale(&mut self, node: Entity, scale: Vec3) -> Result<()> {
        self.edit_local(node, |n| n.local_scale = scale)
    }

    /// Set local orientation from Euler angles, see [`math::euler_to_quat`].
    pub fn set_local_euler_angles(&mut self, node: Entity, angles: Vec3) -> Result<()> {
        self.set_local_orientation(node, math::euler_to_quat(angles))
    }

    /// Replace all three local fields with a single cascade.
    pub fn set_local_transform(&mut self, node: Entity, local: Transform) -> Result<()> {
        self.edit_local(node, |n| {
            n.local_position = local.position;
            n.local_orientation = local.rotation;
            n.local_scale = local.scale;
        })
    }

    // ---------------------------------------------------------------------
    // World-space edits
    // ---------------------------------------------------------------------

    /// Move the node to a world position.
    ///
    /// The new local position is derived through the inverse of the parent's
    /// world matrix, then the world fields are recomputed from it. The stored
    /// world position may differ from `position` by floating-point
    /// round-trip error.
    ///
    /// Fails with [`HierarchyError::NonInvertibleTransform`] if the parent's
    /// world matrix is singular.
    pub fn set_world_position(&mut self, node: Entity, position: Vec3) -> Result<()> {
        self.edit_world(node, |n| n.world_position = position)
    }

    pub fn set_world_orientation(&mut self, node: Entity, orientation: Quat) -> Result<()> {
        self.edit_world(node, |n| n.world_orientation = orientation)
    }

    pub fn set_world_scale(&mut self, node: Entity, scale: Vec3) -> Result<()> {
        self.edit_world(node, |n| n.world_scale = scale)
    }

    pub fn set_world_euler_angles(&mut self, node: Entity, angles: Vec3) -> Result<()> {
        self.set_world_orientation(node, math::euler_to_quat(angles))
    }

    pub fn set_world_transform(&mut self, node: Entity, world: Transform) -> Result<()> {
        self.edit_world(node, |n| {
            n.world_position = world.position;
            n.world_orientation = world.rotation;
            n.world_scale = world.scale;
        })
    }

    /// Turn the node so its forward axis points along `direction`.
    pub fn set_forward(&mut self, node: Entity, direction: Vec3, up: Vec3) -> Result<()> {
        let orientation =
            math::look_rotation(direction, up).ok_or(HierarchyError::ZeroDirection)?;
        self.set_world_orientation(node, orientation)
    }

    /// Turn the node so its forward axis points at a world-space `target`.
    pub fn look_at(&mut self, node: Entity, target: Vec3, up: Vec3) -> Result<()> {
        let position = self.node(node)?.world_position;
        self.set_forward(node, target - position, up)
    }

    // ---------------------------------------------------------------------
    // Reparenting
    // ---------------------------------------------------------------------

    /// Make `child` a child of `parent`. Does nothing if it already is.
    ///
    /// Uses the configured
    /// [`keep_world_transform`](HierarchyConfig::keep_world_transform) policy.
    pub fn add_child(&mut self, parent: Entity, child: Entity) -> Result<()> {
        if self.node(parent)?.children.contains(&child) {
            return Ok(());
        }
        self.set_parent(child, Some(parent), self.config.keep_world_transform)
    }

    /// Detach `child` from `parent`, making it a root. Does nothing if it is
    /// not a child of `parent`.
    pub fn remove_child(&mut self, parent: Entity, child: Entity) -> Result<()> {
        if !self.node(parent)?.children.contains(&child) {
            return Ok(());
        }
        self.set_parent(child, None, self.config.keep_world_transform)
    }

    /// Move `node` under `new_parent`, or make it a root with `None`.
    ///
    /// With `keep_world_transform`, the node stays where it is in world space
    /// and its local fields are rederived for the new parent. Without it, the
    /// local fields are kept verbatim and the world pose jumps to wherever
    /// they land under the new parent.
    ///
    /// # Errors
    ///
    /// - [`HierarchyError::NoSuchNode`] if either handle is dead
    /// - [`HierarchyError::CyclicParent`] if `new_parent` is `node` or one of
    ///   its descendants
    /// - [`HierarchyError::NonInvertibleTransform`] if `keep_world_transform`
    ///   is set and the new parent's world matrix is singular
    ///
    /// Nothing is modified when an error is returned.
    pub fn set_parent(
        &mut self,
        node: Entity,
        new_parent: Option<Entity>,
        keep_world_transform: bool,
    ) -> Result<()> {
        let old_parent = self.node(node)?.parent;

        if let Some(parent) = new_parent {
            if !self.contains(parent) {
                return Err(HierarchyError::NoSuchNode(parent));
            }
            if parent == node || self.is_ancestor_of(node, parent)? {
                log::warn!("rejected reparenting {node:?} under {parent:?}: cycle");
                return Err(HierarchyError::CyclicParent { node, parent });
            }
        }

        // The new parent is not in this node's subtree, so its world matrix
        // is unaffected by anything below and can be inverted up front.
        let parent_inverse = if keep_world_transform {
            let parent_world = match new_parent {
                Some(parent) => self.node(parent)?.world_matrix,
                None => Mat4::IDENTITY,
            };
            Some(self.invert_parent_world(node, &parent_world)?)
        } else {
            None
        };

        log::debug!(
            "reparenting {node:?}: {old_parent:?} -> {new_parent:?} (keep world: {keep_world_transform})"
        );

        if let Some(old) = old_parent.filter(|old| Some(*old) != new_parent) {
            self.unlink_child(old, node);
        }

        let epsilon = self.config.decompose_epsilon;
        {
            let n = self.node_mut(node)?;
            n.parent = new_parent;
            // World fields still hold the pose from before the move.
            if let Some(inverse) = &parent_inverse {
                n.derive_local_from_world(inverse, epsilon);
            }
        }
        self.recompute_from_local(node);

        if let Some(parent) = new_parent {
            let p = self.node_mut(parent)?;
            if !p.children.contains(&node) {
                p.children.push(node);
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // GPU hand-off
    // ---------------------------------------------------------------------

    /// Model uniforms for `root` and its subtree, depth-first pre-order.
    pub fn model_uniforms(&self, root: Entity) -> Result<Vec<ModelUniforms>> {
        let epsilon = self.config.singular_epsilon;
        let mut out = vec![ModelUniforms::from_world_matrix(
            &self.world_matrix(root)?,
            epsilon,
        )];
        for entity in self.descendants(root)? {
            out.push(ModelUniforms::from_world_matrix(
                &self.world_matrix(entity)?,
                epsilon,
            ));
        }
        Ok(out)
    }

    /// Model uniforms for every node, one root subtree after another.
    pub fn all_model_uniforms(&self) -> Result<Vec<ModelUniforms>> {
        let mut out = Vec::with_capacity(self.len());
        for root in self.roots() {
            out.extend(self.model_uniforms(root)?);
        }
        Ok(out)
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn node_mut(&mut self, node: Entity) -> Result<&mut TransformNode> {
        self.world
            .query_one_mut::<&mut TransformNode>(node)
            .map_err(|_| HierarchyError::NoSuchNode(node))
    }

    fn parent_world_matrix(&self, node: Entity) -> Result<Mat4> {
        match self.node(node)?.parent {
            Some(parent) => self.world_matrix(parent),
            None => Ok(Mat4::IDENTITY),
        }
    }

    fn invert_parent_world(&self, node: Entity, parent_world: &Mat4) -> Result<Mat4> {
        math::try_inverse(parent_world, self.config.singular_epsilon).ok_or_else(|| {
            log::warn!("rejected world-space edit of {node:?}: parent transform is singular");
            HierarchyError::NonInvertibleTransform { node }
        })
    }

    fn unlink_child(&mut self, parent: Entity, child: Entity) {
        if let Ok(p) = self.node_mut(parent) {
            p.children.retain(|c| *c != child);
        }
    }

    fn edit_local(&mut self, node: Entity, edit: impl FnOnce(&mut TransformNode)) -> Result<()> {
        edit(self.node_mut(node)?);
        self.recompute_from_local(node);
        Ok(())
    }

    /// Two-phase world edit: derive local fields from the requested world
    /// fields, then let the local path rebuild matrices and cascade.
    fn edit_world(&mut self, node: Entity, edit: impl FnOnce(&mut TransformNode)) -> Result<()> {
        let parent_world = self.parent_world_matrix(node)?;
        let inverse = self.invert_parent_world(node, &parent_world)?;
        let epsilon = self.config.decompose_epsilon;

        let n = self.node_mut(node)?;
        edit(&mut *n);
        n.derive_local_from_world(&inverse, epsilon);
        self.recompute_from_local(node);
        Ok(())
    }

    /// Rebuild `root` from its local fields and cascade to every descendant.
    ///
    /// Pre-order, so each node sees its parent's final world matrix. Uses an
    /// explicit stack; deep hierarchies do not grow the call stack.
    fn recompute_from_local(&mut self, root: Entity) {
        let epsilon = self.config.decompose_epsilon;
        let mut stack = vec![root];
        let mut visited = 0usize;

        while let Some(entity) = stack.pop() {
            let Ok(parent_world) = self.parent_world_matrix(entity) else {
                continue;
            };
            let Ok(node) = self.node_mut(entity) else {
                continue;
            };
            node.refresh_from_local(&parent_world, epsilon);
            stack.extend(node.children.iter().rev().copied());
            visited += 1;
        }

        log::trace!("cascade from {root:?} updated {visited} nodes");
    }
}
