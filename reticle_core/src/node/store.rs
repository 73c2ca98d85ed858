// Copyright 2026 the Reticle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, registration, and property
//! management.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::id::{INVALID, NodeId, NodeKind};
use super::space::SpaceState;
use super::traverse::Children;
use crate::cursor::{Cursor, CursorRay};
use crate::dirty;
use crate::element::HudElement;
use crate::error::TreeError;
use crate::order::ROOT_KEY;

/// Struct-of-arrays storage for every node of a HUD.
///
/// Nodes are addressed by [`NodeId`] handles. Internally, each node occupies
/// a slot in parallel arrays. Destroyed nodes are recycled via a free list,
/// and generation counters prevent stale handle access.
///
/// Besides the nodes, the tree carries the state shared by a whole frame:
/// the pause flag, the accessors-stale flag, the cursor, and the default
/// root coordinate space.
pub struct HudTree {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,
    pub(crate) kind: Vec<NodeKind>,

    // -- Local properties (set by callers) --
    pub(crate) visible: Vec<bool>,
    pub(crate) scale: Vec<f32>,
    pub(crate) z_offset: Vec<i8>,
    pub(crate) inner_z_offset: Vec<u8>,

    // -- Inherited baseline (snapshot of the parent's effective values) --
    pub(crate) parent_visible: Vec<bool>,
    pub(crate) parent_scale: Vec<f32>,
    pub(crate) parent_z_offset: Vec<i32>,

    // -- Per-pass cache --
    pub(crate) full_z_offset: Vec<u16>,
    pub(crate) hud_space: Vec<u32>,

    // -- Behavior --
    pub(crate) elements: Vec<Option<Box<dyn HudElement>>>,
    pub(crate) spaces: Vec<Option<SpaceState>>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Frame state --
    pub(crate) accessors_stale: bool,
    pub(crate) paused: bool,
    pub(crate) cursor: Cursor,
    pub(crate) root_space: SpaceState,
}

impl fmt::Debug for HudTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HudTree")
            .field("len", &self.len)
            .field("free", &self.free_list.len())
            .field("accessors_stale", &self.accessors_stale)
            .field("paused", &self.paused)
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

impl Default for HudTree {
    fn default() -> Self {
        Self::new()
    }
}

impl HudTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            kind: Vec::new(),
            visible: Vec::new(),
            scale: Vec::new(),
            z_offset: Vec::new(),
            inner_z_offset: Vec::new(),
            parent_visible: Vec::new(),
            parent_scale: Vec::new(),
            parent_z_offset: Vec::new(),
            full_z_offset: Vec::new(),
            hud_space: Vec::new(),
            elements: Vec::new(),
            spaces: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            accessors_stale: true,
            paused: false,
            cursor: Cursor::default(),
            root_space: SpaceState::new(),
        }
    }

    // -- Allocation API --

    /// Creates a traversal root.
    ///
    /// Roots own children but can never be attached to a parent.
    pub fn create_root(&mut self) -> NodeId {
        self.alloc(NodeKind::Root, None)
    }

    /// Creates an unregistered node with no behavior.
    pub fn create_node(&mut self) -> NodeId {
        self.alloc(NodeKind::Node, None)
    }

    /// Creates an unregistered node driven by `element`.
    pub fn create_node_with(&mut self, element: impl Into<Box<dyn HudElement>>) -> NodeId {
        self.alloc(NodeKind::Node, Some(element.into()))
    }

    /// Creates an unregistered coordinate-space node with an identity
    /// plane-to-world transform.
    pub fn create_space(&mut self) -> NodeId {
        self.alloc(NodeKind::Space, None)
    }

    /// Creates an unregistered coordinate-space node driven by `element`.
    pub fn create_space_with(&mut self, element: impl Into<Box<dyn HudElement>>) -> NodeId {
        self.alloc(NodeKind::Space, Some(element.into()))
    }

    /// Replaces the behavior attached to a node.
    pub fn set_element(&mut self, id: NodeId, element: impl Into<Box<dyn HudElement>>) {
        self.validate(id);
        self.elements[id.idx as usize] = Some(element.into());
    }

    /// Destroys a node and its whole subtree, freeing their slots for reuse.
    ///
    /// The node is detached from its parent first. Handles to any destroyed
    /// node become stale.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy(&mut self, id: NodeId) {
        self.validate(id);
        self.detach(id);

        let mut doomed = Vec::new();
        self.collect_subtree(id.idx, &mut doomed);
        for idx in doomed {
            let i = idx as usize;
            self.dirty.remove_key(idx);
            // Bump generation so old handles immediately fail validation.
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.elements[i] = None;
            self.spaces[i] = None;
            self.free_list.push(idx);
        }
        self.accessors_stale = true;
        log::trace!("destroyed subtree at {id:?}");
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        id.idx < self.len && self.generation[id.idx as usize] == id.generation
    }

    /// Returns the kind of a node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.validate(id);
        self.kind[id.idx as usize]
    }

    // -- Registration API --

    /// Attaches `child` as the last child of `parent`.
    ///
    /// On success the child snapshots the parent's current effective
    /// visibility, scale, and z-offset as its inherited baseline, and the
    /// accessor list is marked stale. Returns `Ok(false)` without changing
    /// anything if `child` already has a parent.
    ///
    /// # Errors
    ///
    /// [`TreeError::SelfParent`] if `child == parent`, and
    /// [`TreeError::NotParentable`] if `child` is a root. Neither node is
    /// modified.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn attach(&mut self, child: NodeId, parent: NodeId) -> Result<bool, TreeError> {
        self.validate(child);
        self.validate(parent);
        if child == parent {
            return Err(TreeError::SelfParent(child));
        }
        if !self.kind[child.idx as usize].is_parentable() {
            return Err(TreeError::NotParentable(child));
        }
        let c = child.idx;
        let p = parent.idx;
        if self.parent[c as usize] != INVALID {
            return Ok(false);
        }

        self.link_last(p, c);

        // Child depends on parent for its inherited baseline.
        let _ = self.dirty.add_dependency(c, p, dirty::INHERITED);

        self.parent_visible[c as usize] = self.chain_visible(p);
        self.parent_scale[c as usize] = self.chain_scale(p);
        self.parent_z_offset[c as usize] = self.chain_z_offset(p);

        self.dirty.mark_with(c, dirty::INHERITED, &EagerPolicy);
        self.accessors_stale = true;
        log::trace!("attached {child:?} to {parent:?}");
        Ok(true)
    }

    /// Detaches a node from its parent.
    ///
    /// The back-reference is cleared, the node's inherited baseline is reset
    /// to visible, unit scale, and zero z-offset, and the accessor list is
    /// marked stale. Returns `false` if the node had no parent.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn detach(&mut self, child: NodeId) -> bool {
        self.validate(child);
        let c = child.idx;
        let p = self.parent[c as usize];
        if p == INVALID {
            return false;
        }

        self.unlink_from_parent(c);
        self.dirty.remove_dependency(c, p, dirty::INHERITED);
        self.reset_baseline(c);

        self.dirty.mark_with(c, dirty::INHERITED, &EagerPolicy);
        self.accessors_stale = true;
        log::trace!("detached {child:?}");
        true
    }

    /// Registers `child` under `parent`.
    ///
    /// Idempotent: returns `Ok(false)` if `child` is already a child of
    /// `parent`, or is owned by a different parent.
    ///
    /// # Errors
    ///
    /// The same structural errors as [`attach`](Self::attach).
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn register_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool, TreeError> {
        self.validate(parent);
        self.validate(child);
        if self.parent[child.idx as usize] != INVALID {
            return Ok(false);
        }
        self.attach(child, parent)
    }

    /// Registers a batch of children under `parent`, in order.
    ///
    /// Children already registered to `parent` are skipped. Processing stops
    /// at the first child that fails its checks; children before it stay
    /// registered. Returns the number of children newly attached.
    ///
    /// # Errors
    ///
    /// [`TreeError::Stale`] for a destroyed handle,
    /// [`TreeError::AlreadyParented`] for a child owned by another parent,
    /// and the structural errors of [`attach`](Self::attach).
    ///
    /// # Panics
    ///
    /// Panics if `parent` is stale.
    pub fn register_children<I>(&mut self, parent: NodeId, children: I) -> Result<usize, TreeError>
    where
        I: IntoIterator<Item = NodeId>,
    {
        self.validate(parent);
        let mut attached = 0;
        for child in children {
            if !self.is_alive(child) {
                return Err(TreeError::Stale(child));
            }
            let owner = self.parent[child.idx as usize];
            if owner == parent.idx {
                continue;
            }
            if owner != INVALID {
                return Err(TreeError::AlreadyParented {
                    child,
                    parent: self.id_at(owner),
                });
            }
            if self.attach(child, parent)? {
                attached += 1;
            }
        }
        Ok(attached)
    }

    /// Removes `child` from `parent`.
    ///
    /// Returns `false` if `child` is not a child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        self.validate(parent);
        self.validate(child);
        if self.parent[child.idx as usize] != parent.idx {
            return false;
        }
        self.detach(child)
    }

    /// Moves `child` to the end of `parent`'s child list so that it is
    /// updated last and drawn above its siblings of equal z-offset.
    ///
    /// Returns `false` if `child` is not a child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn set_focus(&mut self, parent: NodeId, child: NodeId) -> bool {
        self.validate(parent);
        self.validate(child);
        let c = child.idx;
        let p = parent.idx;
        if self.parent[c as usize] != p {
            return false;
        }
        if self.next_sibling[c as usize] != INVALID {
            self.unlink_from_parent(c);
            self.link_last(p, c);
            self.accessors_stale = true;
        }
        true
    }

    /// Returns whether the node is registered to a parent.
    #[must_use]
    pub fn is_registered(&self, id: NodeId) -> bool {
        self.validate(id);
        self.parent[id.idx as usize] != INVALID
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.id_at(p))
    }

    /// Returns an iterator over the direct children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns every live root node.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        (0..self.len)
            .filter(|&idx| {
                self.kind[idx as usize] == NodeKind::Root && !self.free_list.contains(&idx)
            })
            .map(|idx| self.id_at(idx))
            .collect()
    }

    // -- Local property API (auto-marks dirty) --

    /// Returns the local visibility flag.
    #[must_use]
    pub fn visible(&self, id: NodeId) -> bool {
        self.validate(id);
        self.visible[id.idx as usize]
    }

    /// Sets the local visibility flag.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.validate(id);
        self.visible[id.idx as usize] = visible;
        self.dirty.mark_with(id.idx, dirty::INHERITED, &EagerPolicy);
    }

    /// Returns the local scale factor.
    #[must_use]
    pub fn scale(&self, id: NodeId) -> f32 {
        self.validate(id);
        self.scale[id.idx as usize]
    }

    /// Sets the local scale factor.
    pub fn set_scale(&mut self, id: NodeId, scale: f32) {
        self.validate(id);
        self.scale[id.idx as usize] = scale;
        self.dirty.mark_with(id.idx, dirty::INHERITED, &EagerPolicy);
    }

    /// Sets the local scale so that the effective scale becomes `scale`
    /// under the current inherited baseline.
    pub fn set_effective_scale(&mut self, id: NodeId, scale: f32) {
        self.validate(id);
        let parent_scale = self.parent_scale[id.idx as usize];
        let local = if parent_scale == 0.0 {
            scale
        } else {
            scale / parent_scale
        };
        self.set_scale(id, local);
    }

    /// Returns the local signed z-offset.
    #[must_use]
    pub fn z_offset(&self, id: NodeId) -> i8 {
        self.validate(id);
        self.z_offset[id.idx as usize]
    }

    /// Sets the local signed z-offset.
    pub fn set_z_offset(&mut self, id: NodeId, z_offset: i8) {
        self.validate(id);
        self.z_offset[id.idx as usize] = z_offset;
        self.dirty.mark_with(id.idx, dirty::INHERITED, &EagerPolicy);
    }

    /// Sets the local z-offset so that the effective z-offset becomes
    /// `z_offset` under the current inherited baseline.
    pub fn set_effective_z_offset(&mut self, id: NodeId, z_offset: i8) {
        self.validate(id);
        let local = wrap_i8(i32::from(z_offset) - self.parent_z_offset[id.idx as usize]);
        self.set_z_offset(id, local);
    }

    /// Returns the inner z-offset feeding the high byte of the ordering key.
    #[must_use]
    pub fn inner_z_offset(&self, id: NodeId) -> u8 {
        self.validate(id);
        self.inner_z_offset[id.idx as usize]
    }

    /// Sets the inner z-offset. Takes effect at the next layout pass.
    pub fn set_inner_z_offset(&mut self, id: NodeId, inner: u8) {
        self.validate(id);
        self.inner_z_offset[id.idx as usize] = inner;
    }

    // -- Effective property API --
    //
    // These combine local values with the inherited baseline as of the last
    // attach or `refresh_inherited` call.

    /// Returns whether the node is effectively visible: locally visible,
    /// every ancestor visible, and the HUD not paused.
    #[must_use]
    pub fn effective_visible(&self, id: NodeId) -> bool {
        self.validate(id);
        !self.paused && self.chain_visible(id.idx)
    }

    /// Returns the local scale multiplied by every ancestor's scale.
    #[must_use]
    pub fn effective_scale(&self, id: NodeId) -> f32 {
        self.validate(id);
        self.chain_scale(id.idx)
    }

    /// Returns the local z-offset plus every ancestor's z-offset, wrapped
    /// into the signed byte range.
    #[must_use]
    pub fn effective_z_offset(&self, id: NodeId) -> i8 {
        self.validate(id);
        wrap_i8(self.chain_z_offset(id.idx))
    }

    /// Returns the full z-offset computed by the last accessor generation or
    /// layout pass.
    #[must_use]
    pub fn full_z_offset(&self, id: NodeId) -> u16 {
        self.validate(id);
        self.full_z_offset[id.idx as usize]
    }

    // -- Frame state API --

    /// Whether the HUD is paused. While paused every hook is skipped and no
    /// node is effectively visible.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pauses or resumes every hook of every node.
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            log::debug!("hud {}", if paused { "paused" } else { "resumed" });
        }
        self.paused = paused;
    }

    /// Whether the tree shape changed since the accessor list was last
    /// generated.
    #[must_use]
    pub fn accessors_stale(&self) -> bool {
        self.accessors_stale
    }

    /// Forces the accessor list to be regenerated before the next frame.
    pub fn mark_accessors_stale(&mut self) {
        self.accessors_stale = true;
    }

    /// Shared cursor state.
    #[must_use]
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Mutable shared cursor state.
    pub fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    /// Replaces the cursor world ray.
    pub fn set_cursor_ray(&mut self, ray: CursorRay) {
        self.cursor.set_ray(ray);
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Builds a handle for a live slot.
    pub(crate) fn id_at(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    pub(crate) fn chain_visible(&self, idx: u32) -> bool {
        self.visible[idx as usize] && self.parent_visible[idx as usize]
    }

    pub(crate) fn chain_scale(&self, idx: u32) -> f32 {
        self.scale[idx as usize] * self.parent_scale[idx as usize]
    }

    pub(crate) fn chain_z_offset(&self, idx: u32) -> i32 {
        i32::from(self.z_offset[idx as usize]) + self.parent_z_offset[idx as usize]
    }

    pub(crate) fn reset_baseline(&mut self, idx: u32) {
        self.parent_visible[idx as usize] = true;
        self.parent_scale[idx as usize] = 1.0;
        self.parent_z_offset[idx as usize] = 0;
    }

    fn alloc(&mut self, kind: NodeKind, element: Option<Box<dyn HudElement>>) -> NodeId {
        let space = (kind == NodeKind::Space).then(SpaceState::new);
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot; `destroy` already bumped the generation.
            let i = idx as usize;
            self.kind[i] = kind;
            self.visible[i] = true;
            self.scale[i] = 1.0;
            self.z_offset[i] = 0;
            self.inner_z_offset[i] = 0;
            self.reset_baseline(idx);
            self.full_z_offset[i] = ROOT_KEY;
            self.hud_space[i] = INVALID;
            self.elements[i] = element;
            self.spaces[i] = space;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.kind.push(kind);
            self.visible.push(true);
            self.scale.push(1.0);
            self.z_offset.push(0);
            self.inner_z_offset.push(0);
            self.parent_visible.push(true);
            self.parent_scale.push(1.0);
            self.parent_z_offset.push(0);
            self.full_z_offset.push(ROOT_KEY);
            self.hud_space.push(INVALID);
            self.elements.push(element);
            self.spaces.push(space);
            self.generation.push(0);
            idx
        };

        self.accessors_stale = true;
        self.id_at(idx)
    }

    /// Appends `c` to the end of `p`'s child list.
    fn link_last(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            // Walk to last child.
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    /// Collects `idx` and every descendant, depth-first pre-order.
    fn collect_subtree(&self, idx: u32, out: &mut Vec<u32>) {
        out.push(idx);
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.collect_subtree(child, out);
            child = self.next_sibling[child as usize];
        }
    }
}

/// Reduces an accumulated z-offset into the signed byte range.
#[expect(
    clippy::cast_possible_truncation,
    reason = "z-offsets wrap modulo the signed byte range by definition"
)]
const fn wrap_i8(z: i32) -> i8 {
    z as i8
}
