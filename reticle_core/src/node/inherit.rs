// Copyright 2026 the Reticle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inherited-baseline propagation.
//!
//! Each node stores a snapshot of its parent's effective visibility, scale,
//! and z-offset. The snapshot is taken on attach and recomputed here for
//! every node marked on the [`INHERITED`](dirty::INHERITED) channel. Because
//! the channel drains parents before children, each recomputation reads a
//! parent baseline that is already current.

use alloc::vec::Vec;

use super::id::INVALID;
use super::store::HudTree;
use crate::dirty;

impl HudTree {
    /// Recomputes the inherited baseline of every node whose ancestry changed
    /// since the last call. Returns the number of nodes refreshed.
    ///
    /// Effective-property getters read the baseline as of the last refresh,
    /// so hosts call this (or let [`Hud`](crate::frame::Hud) call it) before
    /// reading effective values after a batch of property changes.
    pub fn refresh_inherited(&mut self) -> usize {
        let affected: Vec<u32> = self
            .dirty
            .drain(dirty::INHERITED)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &affected {
            let p = self.parent[idx as usize];
            if p == INVALID {
                self.reset_baseline(idx);
                continue;
            }
            self.parent_visible[idx as usize] = self.chain_visible(p);
            self.parent_scale[idx as usize] = self.chain_scale(p);
            self.parent_z_offset[idx as usize] = self.chain_z_offset(p);
        }
        affected.len()
    }
}
