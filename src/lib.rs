//! # Tucan Transform
//!
//! **A spatial transform hierarchy that never drifts.**
//!
//! Every node keeps a local pose (relative to its parent) and a world pose
//! (relative to the root), plus cached local and world matrices. Edits in
//! either space, and reparenting with or without keeping the world pose,
//! leave all of them consistent for the node and its whole subtree before
//! the call returns.
//!
//! ## Quick Start
//!
//! ```
//! use tucan_transform::*;
//!
//! let mut scene = TransformHierarchy::new();
//!
//! let sun = scene.spawn();
//! let earth = scene.spawn_with_transform(Transform::from_position(Vec3::new(10.0, 0.0, 0.0)));
//! let moon = scene.spawn_with_transform(Transform::from_position(Vec3::new(11.0, 0.0, 0.0)));
//!
//! // Keep world poses while building the tree.
//! scene.add_child(sun, earth)?;
//! scene.add_child(earth, moon)?;
//! assert!(scene.local(moon)?.position.abs_diff_eq(Vec3::X, 1e-5));
//!
//! // Spinning the sun carries everything below it.
//! scene.set_local_orientation(sun, Quat::from_rotation_y(std::f32::consts::PI))?;
//! assert!(scene.world(moon)?.position.abs_diff_eq(Vec3::new(-11.0, 0.0, 0.0), 1e-4));
//!
//! // World-space edits derive the local values for you.
//! scene.set_world_position(moon, Vec3::new(0.0, 5.0, 0.0))?;
//! assert!(scene.world(moon)?.position.abs_diff_eq(Vec3::new(0.0, 5.0, 0.0), 1e-4));
//! # Ok::<(), HierarchyError>(())
//! ```
//!
//! ## Guarantees
//!
//! - **Eager cascade** — setters update the whole subtree before returning;
//!   matrix getters never recompute.
//! - **No cycles** — reparenting a node under itself or a descendant fails
//!   with [`HierarchyError::CyclicParent`].
//! - **No NaN** — world-space edits under a singular parent fail with
//!   [`HierarchyError::NonInvertibleTransform`], and zero-scale axes decompose
//!   to finite values.
//! - **All or nothing** — a failed call changes nothing.
//! - **Stable handles** — nodes are [`Entity`] handles; stale ones fail with
//!   [`HierarchyError::NoSuchNode`].

mod config;
mod error;
mod hierarchy;
pub mod math;
mod node;
mod transform;
mod uniforms;

pub use config::HierarchyConfig;
pub use error::{HierarchyError, Result};
pub use hierarchy::TransformHierarchy;
pub use node::TransformNode;
pub use transform::Transform;
pub use uniforms::ModelUniforms;

// Re-export glam math types for convenience
pub use glam::{Mat4, Quat, Vec3};

// Node handles
pub use hecs::Entity;
