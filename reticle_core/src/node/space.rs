// Copyright 2026 the Reticle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coordinate-space state and cursor projection.
//!
//! A space node owns a plane-to-world transform and the cursor position
//! projected into that plane. Descendants render and hit-test in the space
//! of their nearest space node; nodes with none use the tree's root space.

use alloc::boxed::Box;
use core::fmt;

use kurbo::Point;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use super::id::{INVALID, NodeId};
use super::store::HudTree;
use crate::cursor::CursorRay;
use crate::transform::{Transform3d, Vec3};

/// A function producing a fresh plane-to-world transform each layout pass.
pub type TransformFn = Box<dyn FnMut() -> Transform3d>;

/// The cursor projected into a space's plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CursorPos {
    /// Position in the plane's local coordinates.
    pub plane: Point,
    /// Squared distance from the ray origin to the intersection, rounded to
    /// six decimal places.
    pub depth: f64,
}

/// Read-only view of the space a node renders in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpaceInfo {
    /// The space node, `None` for the root space.
    pub space: Option<NodeId>,
    /// Whether the host should draw the cursor inside this space.
    pub draw_cursor: bool,
    /// Effective scale of the space node.
    pub scale: f32,
    /// Plane-to-world transform as of the last layout pass.
    pub plane_to_world: Transform3d,
}

pub(crate) struct SpaceState {
    pub(crate) plane_to_world: Transform3d,
    pub(crate) update_fn: Option<TransformFn>,
    pub(crate) cursor_pos: Option<CursorPos>,
    pub(crate) draw_cursor: bool,
}

impl fmt::Debug for SpaceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpaceState")
            .field("plane_to_world", &self.plane_to_world)
            .field("has_update_fn", &self.update_fn.is_some())
            .field("cursor_pos", &self.cursor_pos)
            .field("draw_cursor", &self.draw_cursor)
            .finish_non_exhaustive()
    }
}

impl SpaceState {
    pub(crate) fn new() -> Self {
        Self {
            plane_to_world: Transform3d::IDENTITY,
            update_fn: None,
            cursor_pos: None,
            draw_cursor: true,
        }
    }

    /// Pulls a fresh transform if an update function is set.
    fn update_transform(&mut self) {
        if let Some(f) = &mut self.update_fn {
            self.plane_to_world = f();
        }
    }
}

/// Projects a cursor ray into the plane of `plane_to_world`.
///
/// The plane passes through the transform's translation with its forward
/// axis as normal. Returns `None` if the ray is parallel to the plane or the
/// transform is singular.
#[must_use]
pub fn project_cursor(plane_to_world: &Transform3d, ray: &CursorRay) -> Option<CursorPos> {
    let origin = plane_to_world.translation();
    let normal = plane_to_world.forward();
    let denom = normal.dot(ray.direction);
    if denom.abs() < f64::EPSILON {
        return None;
    }
    let t = normal.dot(origin - ray.origin) / denom;
    let hit = ray.point_at(t);
    let local = plane_to_world.inverse()?.transform_point(hit);
    let depth = round_micro((hit - ray.origin).length_squared());
    Some(CursorPos {
        plane: Point::new(local.x, local.y),
        depth,
    })
}

fn round_micro(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}

impl HudTree {
    /// Sets the function that supplies a space node's plane-to-world
    /// transform at the start of its layout hook.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or not a space node.
    pub fn set_transform_fn(&mut self, id: NodeId, f: impl FnMut() -> Transform3d + 'static) {
        self.space_mut(id).update_fn = Some(Box::new(f));
    }

    /// Removes a space node's transform function. The last transform stays
    /// in effect.
    pub fn clear_transform_fn(&mut self, id: NodeId) {
        self.space_mut(id).update_fn = None;
    }

    /// Sets a space node's plane-to-world transform directly.
    pub fn set_plane_to_world(&mut self, id: NodeId, plane_to_world: Transform3d) {
        self.space_mut(id).plane_to_world = plane_to_world;
    }

    /// Returns a space node's plane-to-world transform.
    #[must_use]
    pub fn plane_to_world(&self, id: NodeId) -> Transform3d {
        self.space_ref(id).plane_to_world
    }

    /// Returns a space node's projected cursor position from its last
    /// layout pass. `None` while hidden or when the ray misses the plane.
    #[must_use]
    pub fn cursor_pos(&self, id: NodeId) -> Option<CursorPos> {
        self.space_ref(id).cursor_pos
    }

    /// Sets whether the host should draw the cursor inside a space.
    pub fn set_draw_cursor_in_space(&mut self, id: NodeId, draw: bool) {
        self.space_mut(id).draw_cursor = draw;
    }

    /// Sets the transform of the root space used by nodes with no space
    /// ancestor.
    pub fn set_root_plane_to_world(&mut self, plane_to_world: Transform3d) {
        self.root_space.plane_to_world = plane_to_world;
    }

    /// Sets the function that supplies the root space transform each frame.
    pub fn set_root_transform_fn(&mut self, f: impl FnMut() -> Transform3d + 'static) {
        self.root_space.update_fn = Some(Box::new(f));
    }

    /// Returns the space a node renders in.
    #[must_use]
    pub fn space_info(&self, id: NodeId) -> SpaceInfo {
        self.validate(id);
        let s = self.hud_space[id.idx as usize];
        match self.space_at(s) {
            Some(state) => SpaceInfo {
                space: Some(self.id_at(s)),
                draw_cursor: state.draw_cursor,
                scale: self.chain_scale(s),
                plane_to_world: state.plane_to_world,
            },
            None => SpaceInfo {
                space: None,
                draw_cursor: self.root_space.draw_cursor,
                scale: 1.0,
                plane_to_world: self.root_space.plane_to_world,
            },
        }
    }

    /// Returns the plane-to-world transform of the space a node renders in.
    #[must_use]
    pub fn space_transform(&self, id: NodeId) -> Transform3d {
        self.validate(id);
        self.space_at(self.hud_space[id.idx as usize])
            .unwrap_or(&self.root_space)
            .plane_to_world
    }

    /// Returns the cursor projected into the space a node renders in.
    #[must_use]
    pub fn space_cursor_pos(&self, id: NodeId) -> Option<CursorPos> {
        self.validate(id);
        self.space_at(self.hud_space[id.idx as usize])
            .unwrap_or(&self.root_space)
            .cursor_pos
    }

    /// Returns the world-space origin of the space a node renders in.
    #[must_use]
    pub fn node_origin(&self, id: NodeId) -> Vec3 {
        self.space_transform(id).translation()
    }

    /// Refreshes the root space transform and cursor projection. Called once
    /// per frame before the layout pass.
    pub fn update_root_space(&mut self) {
        self.root_space.update_transform();
        self.root_space.cursor_pos = project_cursor(&self.root_space.plane_to_world, self.cursor.ray());
    }

    /// Refreshes a space node's transform and cursor projection ahead of its
    /// layout hook. Hidden spaces lose their cursor position.
    pub(crate) fn prepare_space(&mut self, idx: u32) {
        let visible = !self.paused && self.chain_visible(idx);
        let ray = *self.cursor.ray();
        if let Some(state) = self.spaces[idx as usize].as_mut() {
            state.update_transform();
            state.cursor_pos = if visible {
                project_cursor(&state.plane_to_world, &ray)
            } else {
                None
            };
        }
    }

    fn space_at(&self, idx: u32) -> Option<&SpaceState> {
        if idx == INVALID {
            return None;
        }
        self.spaces.get(idx as usize).and_then(Option::as_ref)
    }

    fn space_ref(&self, id: NodeId) -> &SpaceState {
        self.validate(id);
        match self.spaces[id.idx as usize].as_ref() {
            Some(state) => state,
            None => panic!("{id:?} is a {:?}, not a space", self.kind[id.idx as usize]),
        }
    }

    fn space_mut(&mut self, id: NodeId) -> &mut SpaceState {
        self.validate(id);
        let kind = self.kind[id.idx as usize];
        match self.spaces[id.idx as usize].as_mut() {
            Some(state) => state,
            None => panic!("{id:?} is a {kind:?}, not a space"),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::Cell;

    use super::*;

    #[test]
    fn identity_plane_through_origin() {
        let ray = CursorRay::default();
        let pos = project_cursor(&Transform3d::IDENTITY, &ray).unwrap();
        assert_eq!(pos.plane, Point::new(0.0, 0.0));
        assert_eq!(pos.depth, 0.0);
    }

    #[test]
    fn offset_plane_reports_squared_depth() {
        let plane = Transform3d::from_translation(0.0, 0.0, -3.0);
        let ray = CursorRay::new(Vec3::new(1.0, 2.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let pos = project_cursor(&plane, &ray).unwrap();
        assert_eq!(pos.plane, Point::new(1.0, 2.0));
        assert_eq!(pos.depth, 9.0);
    }

    #[test]
    fn scaled_plane_maps_to_local_units() {
        let plane = Transform3d::from_scale(2.0, 2.0, 1.0);
        let ray = CursorRay::new(Vec3::new(4.0, -2.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let pos = project_cursor(&plane, &ray).unwrap();
        assert_eq!(pos.plane, Point::new(2.0, -1.0));
        assert_eq!(pos.depth, 25.0);
    }

    #[test]
    fn parallel_ray_misses() {
        let ray = CursorRay::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(project_cursor(&Transform3d::IDENTITY, &ray), None);
    }

    #[test]
    fn singular_plane_misses() {
        let plane = Transform3d::from_scale(0.0, 1.0, 1.0);
        assert_eq!(project_cursor(&plane, &CursorRay::default()), None);
    }

    #[test]
    fn depth_rounds_to_six_decimals() {
        assert_eq!(round_micro(0.123_456_789), 0.123_457);
    }

    #[test]
    fn prepare_space_pulls_transform_fn() {
        let mut tree = HudTree::new();
        let space = tree.create_space();
        let calls = Rc::new(Cell::new(0_u32));
        let counter = Rc::clone(&calls);
        tree.set_transform_fn(space, move || {
            counter.set(counter.get() + 1);
            Transform3d::from_translation(0.0, 0.0, -2.0)
        });

        tree.prepare_space(space.idx);
        assert_eq!(calls.get(), 1);
        assert_eq!(tree.plane_to_world(space).translation(), Vec3::new(0.0, 0.0, -2.0));
        assert_eq!(tree.cursor_pos(space).map(|p| p.depth), Some(4.0));
    }

    #[test]
    fn hidden_space_has_no_cursor() {
        let mut tree = HudTree::new();
        let space = tree.create_space();
        tree.set_visible(space, false);
        tree.prepare_space(space.idx);
        assert_eq!(tree.cursor_pos(space), None);
    }

    #[test]
    fn descendants_share_space_info() {
        let mut tree = HudTree::new();
        let root = tree.create_root();
        let space = tree.create_space();
        let child = tree.create_node();
        tree.attach(space, root).unwrap();
        tree.attach(child, space).unwrap();
        tree.set_scale(space, 2.0);
        tree.set_draw_cursor_in_space(space, false);
        tree.set_plane_to_world(space, Transform3d::from_translation(1.0, 2.0, 3.0));
        let mut out = Vec::new();
        tree.generate_update_accessors(root, &mut out, 0);

        let info = tree.space_info(child);
        assert_eq!(info.space, Some(space));
        assert!(!info.draw_cursor);
        assert_eq!(info.scale, 2.0);
        assert_eq!(tree.node_origin(child), Vec3::new(1.0, 2.0, 3.0));

        let root_info = tree.space_info(root);
        assert_eq!(root_info.space, None);
        assert_eq!(root_info.plane_to_world, Transform3d::IDENTITY);
    }

    #[test]
    fn root_space_follows_config() {
        let mut tree = HudTree::new();
        let node = tree.create_node();
        tree.set_root_plane_to_world(Transform3d::from_translation(0.0, 0.0, -1.0));
        tree.update_root_space();
        assert_eq!(tree.space_cursor_pos(node).map(|p| p.depth), Some(1.0));
    }

    #[test]
    #[should_panic(expected = "not a space")]
    fn plain_node_has_no_space_state() {
        let mut tree = HudTree::new();
        let node = tree.create_node();
        tree.set_plane_to_world(node, Transform3d::IDENTITY);
    }
}
