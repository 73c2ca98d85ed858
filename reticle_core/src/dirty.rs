// Copyright 2026 the Reticle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The tree uses [`understory_dirty`] to track which nodes hold a stale
//! inherited baseline. Each node depends on its parent on the
//! [`INHERITED`] channel, so marking a node with
//! [`EagerPolicy`](understory_dirty::EagerPolicy) also marks its whole
//! subtree.
//!
//! Local visibility, scale, and z-offset setters mark the node; attaching
//! and detaching mark the moved subtree. Each
//! [`HudTree::refresh_inherited`](crate::node::HudTree::refresh_inherited)
//! call drains the channel in parent-before-child order and recomputes the
//! baseline of every affected node.
//!
//! Tree shape changes are not a channel: they set the tree's
//! accessors-stale flag, which the [`Hud`](crate::frame::Hud) driver checks
//! before running a frame.

use understory_dirty::Channel;

/// Local visibility, scale, or z-offset changed, or the node moved in the
/// tree; the inherited baseline of the node and its descendants is stale.
pub const INHERITED: Channel = Channel::new(0);
