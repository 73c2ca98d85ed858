// Copyright 2026 the Reticle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-frame traversal driver.
//!
//! [`Hud`] owns a [`HudTree`], its root node, and the flattened
//! update-accessor list. Each [`run_frame`](Hud::run_frame) call:
//!
//! 1. Refreshes inherited baselines and regenerates the accessor list if the
//!    tree shape changed since the last frame.
//! 2. Releases last frame's cursor capture and runs the depth-test pass in
//!    ascending full z-offset order.
//! 3. Runs the input pass topmost first (descending order).
//! 4. Refreshes the root space, then runs the layout pass in depth-first tree
//!    order so parents lay out before their children.
//! 5. Re-sorts by the keys refreshed during layout and runs the draw pass
//!    back to front.
//!
//! Nodes with equal keys keep their depth-first order in every sorted pass.
//! Nodes attached by a hook join the list at the start of the next frame;
//! nodes destroyed by a hook are skipped for the rest of the current one.

use alloc::vec::Vec;

use crate::accessor::{Phase, PhaseOutcome, UpdateAccessor};
use crate::cursor::CursorRay;
use crate::diagnostics::{FaultSink, LogSink};
use crate::node::{HudTree, NodeId};
use crate::trace::{
    FaultEvent, FrameSummary, FrameSummaryBuilder, PhaseBeginEvent, RebuildEvent, Tracer,
};
use crate::transform::Transform3d;

/// Runtime configuration for a [`Hud`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HudConfig {
    /// Initial capacity of the update-accessor list.
    pub accessor_capacity: usize,
    /// Run input hooks topmost first. When `false`, input runs in draw
    /// order.
    pub input_topmost_first: bool,
    /// Plane-to-world transform of the root space.
    pub root_plane_to_world: Transform3d,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            accessor_capacity: 64,
            input_topmost_first: true,
            root_plane_to_world: Transform3d::IDENTITY,
        }
    }
}

/// A HUD: one tree with one root, driven frame by frame.
#[derive(Debug)]
pub struct Hud<S: FaultSink = LogSink> {
    tree: HudTree,
    root: NodeId,
    accessors: Vec<UpdateAccessor>,
    order: Vec<u32>,
    sink: S,
    frame_index: u64,
    config: HudConfig,
}

impl Hud {
    /// Creates a HUD with default configuration that logs faults.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(HudConfig::default(), LogSink)
    }
}

impl Default for Hud {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: FaultSink> Hud<S> {
    /// Creates a HUD with default configuration reporting faults to `sink`.
    #[must_use]
    pub fn with_sink(sink: S) -> Self {
        Self::with_config(HudConfig::default(), sink)
    }

    /// Creates a HUD from explicit configuration.
    #[must_use]
    pub fn with_config(config: HudConfig, sink: S) -> Self {
        let mut tree = HudTree::new();
        let root = tree.create_root();
        tree.set_root_plane_to_world(config.root_plane_to_world);
        Self {
            tree,
            root,
            accessors: Vec::with_capacity(config.accessor_capacity),
            order: Vec::with_capacity(config.accessor_capacity),
            sink,
            frame_index: 0,
            config,
        }
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The node tree.
    #[must_use]
    pub fn tree(&self) -> &HudTree {
        &self.tree
    }

    /// Mutable access to the node tree.
    pub fn tree_mut(&mut self) -> &mut HudTree {
        &mut self.tree
    }

    /// The fault sink.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the fault sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// The configuration this HUD was built with.
    #[must_use]
    pub fn config(&self) -> &HudConfig {
        &self.config
    }

    /// Index of the next frame to run.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// The current update-accessor list in depth-first order.
    #[must_use]
    pub fn accessors(&self) -> &[UpdateAccessor] {
        &self.accessors
    }

    /// The current update-accessor list in ascending full z-offset order.
    pub fn accessors_by_key(&self) -> impl Iterator<Item = &UpdateAccessor> + '_ {
        self.order.iter().map(|&i| &self.accessors[i as usize])
    }

    /// Replaces the cursor world ray used by the next frame.
    pub fn set_cursor_ray(&mut self, ray: CursorRay) {
        self.tree.set_cursor_ray(ray);
    }

    /// Pauses or resumes every hook.
    pub fn set_paused(&mut self, paused: bool) {
        self.tree.set_paused(paused);
    }

    /// Regenerates the update-accessor list from the root and clears the
    /// tree's accessors-stale flag.
    pub fn rebuild_accessors(&mut self) {
        self.accessors.clear();
        self.tree
            .generate_update_accessors(self.root, &mut self.accessors, 0);
        self.sort_order();
        self.tree.accessors_stale = false;
        log::debug!("rebuilt {} update accessors", self.accessors.len());
    }

    /// Runs one frame without tracing.
    pub fn run_frame(&mut self) -> FrameSummary {
        self.run_frame_traced(&mut Tracer::none())
    }

    /// Runs one frame, emitting trace events.
    pub fn run_frame_traced(&mut self, tracer: &mut Tracer<'_>) -> FrameSummary {
        let mut summary = FrameSummaryBuilder::new(self.frame_index);

        self.tree.refresh_inherited();
        let rebuilt = self.rebuild_if_stale(tracer);
        self.tree.cursor.reset_capture();

        self.run_phase(Phase::DepthTest, tracer, &mut summary);
        self.run_phase(Phase::Input, tracer, &mut summary);

        self.tree.update_root_space();
        self.run_phase(Phase::Layout, tracer, &mut summary);
        // Shape edits made by hooks wait for next frame's rebuild so every
        // drawn node has been laid out first.
        self.sort_order();
        self.tree.refresh_inherited();

        self.run_phase(Phase::Draw, tracer, &mut summary);

        summary.set_rebuilt(rebuilt);
        summary.set_node_count(self.accessors.len());
        let summary = summary.finish();
        tracer.frame_summary(&summary);
        self.frame_index += 1;
        summary
    }

    fn rebuild_if_stale(&mut self, tracer: &mut Tracer<'_>) -> bool {
        if !self.tree.accessors_stale() {
            return false;
        }
        self.rebuild_accessors();
        tracer.rebuild(&RebuildEvent {
            frame_index: self.frame_index,
            node_count: self.accessors.len(),
        });
        true
    }

    fn run_phase(
        &mut self,
        phase: Phase,
        tracer: &mut Tracer<'_>,
        summary: &mut FrameSummaryBuilder,
    ) {
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index: self.frame_index,
            phase,
        });
        let n = self.accessors.len();
        for k in 0..n {
            let i = match phase {
                Phase::Layout => k,
                Phase::Input if self.config.input_topmost_first => {
                    self.order[n - 1 - k] as usize
                }
                _ => self.order[k] as usize,
            };
            let outcome = self.accessors[i].run(phase, &mut self.tree, &mut self.sink);
            if outcome == PhaseOutcome::Faulted {
                tracer.fault(&FaultEvent {
                    frame_index: self.frame_index,
                    node: self.accessors[i].node(),
                    phase,
                });
            }
            summary.record(phase, outcome);
        }
        tracer.phase_end(&summary.phase_end_event(phase));
    }

    /// Stable sort of accessor indices by key; ties keep depth-first order.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "slot indices are u32, so no tree holds more accessors"
    )]
    fn sort_order(&mut self) {
        self.order.clear();
        self.order.extend(0..self.accessors.len() as u32);
        let accessors = &self.accessors;
        self.order
            .sort_by_key(|&i| accessors[i as usize].full_z_offset());
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use super::*;
    use crate::diagnostics::FaultLog;
    use crate::element::{ElementCx, HookResult, HudElement};

    type Log = Rc<RefCell<Vec<(Phase, u32)>>>;

    struct Tag {
        id: u32,
        log: Log,
    }

    impl Tag {
        fn push(&self, phase: Phase) -> HookResult {
            self.log.borrow_mut().push((phase, self.id));
            Ok(())
        }
    }

    impl HudElement for Tag {
        fn handle_input(&mut self, _cx: &mut ElementCx<'_>) -> HookResult {
            self.push(Phase::Input)
        }
        fn layout(&mut self, _cx: &mut ElementCx<'_>) -> HookResult {
            self.push(Phase::Layout)
        }
        fn draw(&mut self, _cx: &mut ElementCx<'_>) -> HookResult {
            self.push(Phase::Draw)
        }
    }

    fn ids(log: &Log, phase: Phase) -> Vec<u32> {
        log.borrow()
            .iter()
            .filter(|(p, _)| *p == phase)
            .map(|&(_, id)| id)
            .collect()
    }

    /// root
    /// ├── 1 (z = 2)
    /// │   └── 2 (z = -5)
    /// └── 3 (z = 0)
    fn build() -> (Hud<FaultLog>, Log) {
        let mut hud = Hud::with_sink(FaultLog::new());
        let log = Log::default();
        let root = hud.root();
        let tree = hud.tree_mut();
        let mut make = |id| {
            tree.create_node_with(Tag {
                id,
                log: Rc::clone(&log),
            })
        };
        let (n1, n2, n3) = (make(1), make(2), make(3));
        tree.register_children(root, [n1, n3]).unwrap();
        tree.attach(n2, n1).unwrap();
        tree.set_z_offset(n1, 2);
        tree.set_z_offset(n2, -5);
        (hud, log)
    }

    #[test]
    fn phases_follow_their_orders() {
        let (mut hud, log) = build();
        hud.run_frame();
        // Keys: 3 -> 0, 2 -> 2 - 5 = -3, 1 -> 2.
        assert_eq!(ids(&log, Phase::Draw), [2, 3, 1]);
        assert_eq!(ids(&log, Phase::Input), [1, 3, 2]);
        assert_eq!(ids(&log, Phase::Layout), [1, 2, 3]);
    }

    #[test]
    fn input_in_draw_order_when_configured() {
        let config = HudConfig {
            input_topmost_first: false,
            ..HudConfig::default()
        };
        let mut hud = Hud::with_config(config, FaultLog::new());
        let log = Log::default();
        let root = hud.root();
        for id in [1, 2] {
            let n = hud.tree_mut().create_node_with(Tag {
                id,
                log: Rc::clone(&log),
            });
            hud.tree_mut().attach(n, root).unwrap();
        }
        hud.run_frame();
        assert_eq!(ids(&log, Phase::Input), [1, 2]);
    }

    #[test]
    fn equal_keys_keep_tree_order() {
        let mut hud = Hud::with_sink(FaultLog::new());
        let root = hud.root();
        let nodes: Vec<_> = (0..5).map(|_| hud.tree_mut().create_node()).collect();
        hud.tree_mut()
            .register_children(root, nodes.iter().copied())
            .unwrap();
        hud.rebuild_accessors();
        let sorted: Vec<_> = hud.accessors_by_key().map(UpdateAccessor::node).collect();
        let dfs: Vec<_> = hud.accessors().iter().map(UpdateAccessor::node).collect();
        assert_eq!(sorted, dfs);
    }

    #[test]
    fn rebuilds_only_when_stale() {
        let (mut hud, _) = build();
        assert!(hud.run_frame().rebuilt);
        assert!(!hud.run_frame().rebuilt);
        let extra = hud.tree_mut().create_node();
        let root = hud.root();
        hud.tree_mut().attach(extra, root).unwrap();
        let summary = hud.run_frame();
        assert!(summary.rebuilt);
        assert_eq!(summary.node_count, 5);
        assert_eq!(hud.frame_index(), 3);
    }

    #[test]
    fn pause_suppresses_everything() {
        let (mut hud, log) = build();
        hud.set_paused(true);
        let summary = hud.run_frame();
        assert!(log.borrow().is_empty());
        for phase in Phase::ALL {
            assert_eq!(summary.ran(phase), 0);
        }
        hud.set_paused(false);
        hud.run_frame();
        assert_eq!(ids(&log, Phase::Draw).len(), 3);
    }

    #[test]
    fn root_space_uses_configured_transform() {
        let config = HudConfig {
            root_plane_to_world: Transform3d::from_translation(0.0, 0.0, -2.0),
            ..HudConfig::default()
        };
        let mut hud = Hud::with_config(config, FaultLog::new());
        hud.run_frame();
        let root = hud.root();
        assert_eq!(hud.tree().space_cursor_pos(root).map(|p| p.depth), Some(4.0));
    }
}
