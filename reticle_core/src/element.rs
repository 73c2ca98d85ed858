// Copyright 2026 the Reticle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The behavior attached to nodes.
//!
//! A [`HudElement`] supplies the four per-frame hooks. Every hook has a no-op
//! default, so widgets override only the phases they care about. Hooks
//! return a [`HookResult`]; an `Err` is caught by the fault boundary in
//! [`accessor`](crate::accessor), reported to the
//! [`FaultSink`](crate::diagnostics::FaultSink), and the frame continues.

use alloc::boxed::Box;

use crate::cursor::Cursor;
use crate::node::{CursorPos, HudTree, NodeId};
use crate::transform::Transform3d;

/// Error type returned by element hooks.
pub type HookError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// Result type returned by element hooks.
pub type HookResult = Result<(), HookError>;

/// Per-frame behavior of a node.
pub trait HudElement {
    /// Compares cursor depth against other coordinate spaces and claims the
    /// cursor if this element should receive input.
    fn depth_test(&mut self, cx: &mut ElementCx<'_>) -> HookResult {
        _ = cx;
        Ok(())
    }

    /// Handles input. Only called while the node is effectively visible.
    fn handle_input(&mut self, cx: &mut ElementCx<'_>) -> HookResult {
        _ = cx;
        Ok(())
    }

    /// Updates layout. Called after the node's ordering key, coordinate
    /// space, and (for space nodes) transform and cursor position have been
    /// refreshed for this frame.
    fn layout(&mut self, cx: &mut ElementCx<'_>) -> HookResult {
        _ = cx;
        Ok(())
    }

    /// Submits draw requests. Only called while the node is effectively
    /// visible.
    fn draw(&mut self, cx: &mut ElementCx<'_>) -> HookResult {
        _ = cx;
        Ok(())
    }
}

/// Convert elements into boxed trait objects.
impl<E> From<E> for Box<dyn HudElement>
where
    E: HudElement + 'static,
{
    fn from(element: E) -> Self {
        Box::new(element)
    }
}

/// Context handed to a hook: the node being updated and mutable access to the
/// tree it lives in.
///
/// Tree mutations made from a hook (attach, detach, property changes) are
/// allowed. Shape changes mark the accessor list stale; the driver
/// regenerates it before the next frame.
#[derive(Debug)]
pub struct ElementCx<'a> {
    pub(crate) tree: &'a mut HudTree,
    pub(crate) node: NodeId,
}

impl<'a> ElementCx<'a> {
    /// Creates a context for `node`.
    pub fn new(tree: &'a mut HudTree, node: NodeId) -> Self {
        Self { tree, node }
    }

    /// The node whose hook is running.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Read access to the tree.
    #[must_use]
    pub fn tree(&self) -> &HudTree {
        self.tree
    }

    /// Mutable access to the tree.
    pub fn tree_mut(&mut self) -> &mut HudTree {
        self.tree
    }

    /// This node's effective scale.
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.tree.effective_scale(self.node)
    }

    /// Whether this node is effectively visible right now.
    #[must_use]
    pub fn visible(&self) -> bool {
        self.tree.effective_visible(self.node)
    }

    /// The plane-to-world transform of the space this node renders in.
    #[must_use]
    pub fn space_transform(&self) -> Transform3d {
        self.tree.space_transform(self.node)
    }

    /// The cursor projected into the plane of the space this node renders
    /// in.
    #[must_use]
    pub fn cursor_pos(&self) -> Option<CursorPos> {
        self.tree.space_cursor_pos(self.node)
    }

    /// Shared cursor state.
    #[must_use]
    pub fn cursor(&self) -> &Cursor {
        self.tree.cursor()
    }

    /// Claims the cursor for this node at its space's projected depth.
    ///
    /// Returns `false` if the cursor does not reach this node's plane or a
    /// closer node already holds it.
    pub fn try_capture_cursor(&mut self) -> bool {
        let Some(pos) = self.cursor_pos() else {
            return false;
        };
        let node = self.node;
        self.tree.cursor_mut().try_capture(node, pos.depth)
    }
}
