// Copyright 2026 the Reticle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural errors raised by tree mutations.

use crate::node::NodeId;

/// A tree mutation that cannot be applied.
///
/// These are hard failures: the operation is aborted and the tree is left as
/// it was before the failing node was processed. Re-registering a node that
/// is already registered is not an error; those calls return `Ok(false)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// A node was attached to itself.
    #[error("{0:?} cannot be parented to itself")]
    SelfParent(NodeId),
    /// A root was given where a parentable node is required.
    #[error("{0:?} is a root and cannot be parented")]
    NotParentable(NodeId),
    /// Bulk registration found a child already owned by another parent.
    #[error("{child:?} is already registered to {parent:?}")]
    AlreadyParented {
        /// The child that failed registration.
        child: NodeId,
        /// Its current parent.
        parent: NodeId,
    },
    /// Bulk registration found a handle to a destroyed node.
    #[error("{0:?} refers to a destroyed node")]
    Stale(NodeId),
}

impl TreeError {
    /// The node that caused the failure.
    #[must_use]
    pub const fn node(&self) -> NodeId {
        match *self {
            Self::SelfParent(id) | Self::NotParentable(id) | Self::Stale(id) => id,
            Self::AlreadyParented { child, .. } => child,
        }
    }
}
