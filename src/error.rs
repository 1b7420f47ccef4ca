//! Errors returned by hierarchy operations.
//!
//! Every fallible operation on [`TransformHierarchy`](crate::TransformHierarchy)
//! validates its inputs before touching any node, so an `Err` always means the
//! hierarchy is exactly as it was before the call.

use hecs::Entity;

/// Errors that can occur when editing a transform hierarchy.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum HierarchyError {
    /// The handle was despawned, or the entity carries no transform node.
    #[error("no transform node for entity {0:?}")]
    NoSuchNode(Entity),

    /// A world-space edit needed the inverse of a singular parent matrix.
    #[error("parent transform of {node:?} is not invertible")]
    NonInvertibleTransform {
        /// The node whose local transform could not be derived.
        node: Entity,
    },

    /// Reparenting would make a node its own ancestor.
    #[error("cannot parent {node:?} under {parent:?}: would create a cycle")]
    CyclicParent {
        /// The node being reparented.
        node: Entity,
        /// The requested parent, which is the node itself or one of its descendants.
        parent: Entity,
    },

    /// [`TransformHierarchy::child`](crate::TransformHierarchy::child) was
    /// called with an index past the end of the children list.
    #[error("child index {index} out of range for {node:?} with {len} children")]
    ChildIndexOutOfRange {
        /// The parent node.
        node: Entity,
        /// The requested index.
        index: usize,
        /// Number of children the node has.
        len: usize,
    },

    /// A look rotation was requested along a zero-length direction.
    #[error("look direction has zero length")]
    ZeroDirection,
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = HierarchyError> = std::result::Result<T, E>;
