// Copyright 2026 the Reticle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cursor world ray and per-frame depth-test capture.
//!
//! The host supplies a fresh [`CursorRay`] before the depth-test and input
//! passes. Coordinate-space nodes project it into their plane during layout;
//! depth-test hooks then compare the projected depths and call
//! [`Cursor::try_capture`] to decide which space owns the cursor for input.

use crate::node::NodeId;
use crate::transform::Vec3;

/// A cursor ray in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CursorRay {
    /// Ray origin, normally the viewer position.
    pub origin: Vec3,
    /// Ray direction. Need not be normalized.
    pub direction: Vec3,
}

impl CursorRay {
    /// Creates a ray from an origin and direction.
    #[inline]
    #[must_use]
    pub const fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Returns the point at parameter `t` along the ray.
    #[inline]
    #[must_use]
    pub fn point_at(&self, t: f64) -> Vec3 {
        self.origin + self.direction * t
    }
}

impl Default for CursorRay {
    /// A ray from the world origin looking down negative Z.
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0))
    }
}

/// Cursor state shared by every node for one frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cursor {
    ray: CursorRay,
    captured: Option<(NodeId, f64)>,
}

impl Cursor {
    /// Returns the current world ray.
    #[must_use]
    pub fn ray(&self) -> &CursorRay {
        &self.ray
    }

    /// Replaces the world ray.
    pub fn set_ray(&mut self, ray: CursorRay) {
        self.ray = ray;
    }

    /// Claims the cursor for `node` at the given squared depth.
    ///
    /// A strictly closer claim replaces the current owner; an equal depth
    /// keeps the first claimant. A re-claim by the owner records its new
    /// depth. Returns whether `node` now owns the cursor.
    pub fn try_capture(&mut self, node: NodeId, depth: f64) -> bool {
        match self.captured {
            Some((owner, ref mut best)) if owner == node => {
                *best = depth;
                true
            }
            Some((_, best)) if depth >= best => false,
            _ => {
                self.captured = Some((node, depth));
                true
            }
        }
    }

    /// The node that owns the cursor this frame, if any.
    #[must_use]
    pub fn captured(&self) -> Option<NodeId> {
        self.captured.map(|(node, _)| node)
    }

    /// The squared depth of the current capture, if any.
    #[must_use]
    pub fn captured_depth(&self) -> Option<f64> {
        self.captured.map(|(_, depth)| depth)
    }

    /// Releases any capture. Called at the start of every depth-test pass.
    pub(crate) fn reset_capture(&mut self) {
        self.captured = None;
    }
}
