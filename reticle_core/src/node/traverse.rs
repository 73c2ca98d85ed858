// Copyright 2026 the Reticle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use alloc::vec::Vec;

use super::id::{INVALID, NodeId, NodeKind};
use super::store::HudTree;
use crate::accessor::UpdateAccessor;
use crate::order::{self, ROOT_KEY};

/// An iterator over the direct children of a node.
///
/// Created by [`HudTree::children`].
#[derive(Debug)]
pub struct Children<'a> {
    tree: &'a HudTree,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(tree: &'a HudTree, first: u32) -> Self {
        Self {
            tree,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.tree.next_sibling[idx as usize];
        Some(self.tree.id_at(idx))
    }
}

impl HudTree {
    /// Flattens the subtree rooted at `id` into `out`, depth-first.
    ///
    /// Each visited node recomputes its full z-offset from its parent's
    /// cached key (or [`ROOT_KEY`] when unparented), resolves its coordinate
    /// space, and appends an [`UpdateAccessor`] tagged with its tree depth.
    /// The node at `id` is tagged with `depth`; each level below adds one.
    /// Capacity for the whole subtree is reserved before the walk.
    ///
    /// This does not clear `out` or the tree's accessors-stale flag; the
    /// [`Hud`](crate::frame::Hud) driver handles both.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn generate_update_accessors(&mut self, id: NodeId, out: &mut Vec<UpdateAccessor>, depth: u8) {
        self.validate(id);
        out.reserve(self.subtree_len(id.idx));
        self.push_accessors(id.idx, out, depth);
    }

    /// Returns the number of nodes in the subtree rooted at `id`, including
    /// `id` itself.
    #[must_use]
    pub fn subtree_size(&self, id: NodeId) -> usize {
        self.validate(id);
        self.subtree_len(id.idx)
    }

    fn push_accessors(&mut self, idx: u32, out: &mut Vec<UpdateAccessor>, depth: u8) {
        self.refresh_order(idx);
        out.push(UpdateAccessor::new(
            self.id_at(idx),
            self.full_z_offset[idx as usize],
            depth,
            self.resolved_space(idx),
        ));
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.push_accessors(child, out, depth.saturating_add(1));
            child = self.next_sibling[child as usize];
        }
    }

    /// Recomputes the cached full z-offset and coordinate space of one node
    /// from its parent's cached values.
    pub(crate) fn refresh_order(&mut self, idx: u32) {
        let i = idx as usize;
        let p = self.parent[i];
        let (parent_key, parent_space) = if p == INVALID {
            (ROOT_KEY, INVALID)
        } else {
            (self.full_z_offset[p as usize], self.hud_space[p as usize])
        };
        self.full_z_offset[i] =
            order::full_z_offset(self.z_offset[i], self.inner_z_offset[i], parent_key);
        self.hud_space[i] = if self.kind[i] == NodeKind::Space {
            idx
        } else {
            parent_space
        };
    }

    /// The cached space of a node as a handle, `None` for the root space.
    pub(crate) fn resolved_space(&self, idx: u32) -> Option<NodeId> {
        let s = self.hud_space[idx as usize];
        (s != INVALID).then(|| self.id_at(s))
    }

    fn subtree_len(&self, idx: u32) -> usize {
        let mut n = 1;
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            n += self.subtree_len(child);
            child = self.next_sibling[child as usize];
        }
        n
    }
}
