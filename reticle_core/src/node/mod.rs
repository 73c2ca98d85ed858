// Copyright 2026 the Reticle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! HUD node tree data model.
//!
//! A *node* is an element of the HUD scene graph. Each node has:
//!
//! - An identity ([`NodeId`]): a generational handle that becomes stale when
//!   the node is destroyed, preventing use-after-free bugs at the API level.
//! - A [`NodeKind`]: roots terminate the tree and can never be parented,
//!   plain nodes can, and space nodes additionally own a coordinate space.
//! - Topology: parent, first-child, and sibling links forming an ordered
//!   tree. The parent link is a lookup index only; children are owned by
//!   their parent and destroyed with it.
//! - **Local properties** set by the caller:
//!   [`visible`](HudTree::set_visible), [`scale`](HudTree::set_scale),
//!   [`z_offset`](HudTree::set_z_offset), and
//!   [`inner_z_offset`](HudTree::set_inner_z_offset).
//! - **Effective properties** combining local values with the baseline
//!   inherited from the parent chain: visibility is AND-ed, scale is
//!   multiplied, and z-offsets are summed.
//! - Optional behavior: a boxed [`HudElement`](crate::element::HudElement).
//!
//! # Dirty tracking
//!
//! Property setters and registration changes mark the
//! [`INHERITED`](crate::dirty::INHERITED) channel, which propagates to every
//! descendant. [`HudTree::refresh_inherited`] recomputes the baseline of each
//! marked node in parent-before-child order.
//!
//! # Coordinate spaces
//!
//! Every node renders in the space of its nearest space-node ancestor, or in
//! the tree's root space when it has none. The resolved space is cached on
//! each node when update accessors are generated and refreshed in every
//! layout pass.

mod id;
mod inherit;
mod space;
mod store;
mod traverse;

pub use id::{INVALID, NodeId, NodeKind};
pub use space::{CursorPos, SpaceInfo, TransformFn, project_cursor};
pub use store::HudTree;
pub use traverse::Children;
