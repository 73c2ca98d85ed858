// Copyright 2026 the Reticle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and [`FaultSink`] and writes
//! one line per event to a [`Write`](std::io::Write) destination (default:
//! stderr). [`dump_tree`] writes an indented view of a node tree.

use std::io::{self, Write};

use reticle_core::diagnostics::{Fault, FaultSink};
use reticle_core::node::{HudTree, NodeId};
use reticle_core::trace::{
    FaultEvent, FrameSummary, PhaseBeginEvent, PhaseEndEvent, RebuildEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_rebuild(&mut self, e: &RebuildEvent) {
        let _ = writeln!(
            self.writer,
            "[rebuild] frame={} nodes={}",
            e.frame_index, e.node_count,
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(self.writer, "[phase:begin] frame={} {}", e.frame_index, e.phase);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {} ran={} skipped={} faulted={}",
            e.frame_index, e.phase, e.ran, e.skipped, e.faulted,
        );
    }

    fn on_fault(&mut self, e: &FaultEvent) {
        let _ = writeln!(
            self.writer,
            "[fault] frame={} node={:?} phase={}",
            e.frame_index, e.node, e.phase,
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let rebuilt = if s.rebuilt { "yes" } else { "no" };
        let _ = writeln!(
            self.writer,
            "[summary] frame={} nodes={} rebuilt={rebuilt} faults={}",
            s.frame_index,
            s.node_count,
            s.total_faults(),
        );
    }
}

impl<W: Write> FaultSink for PrettyPrintSink<W> {
    fn report(&mut self, fault: &Fault) {
        let _ = writeln!(self.writer, "[error] {fault}");
    }
}

/// Writes the subtree rooted at `root` as an indented list, one node per
/// line, with each node's kind and effective properties.
///
/// Effective values are read as of the tree's last inherited refresh.
pub fn dump_tree(tree: &HudTree, root: NodeId, writer: &mut dyn Write) -> io::Result<()> {
    dump_node(tree, root, 0, writer)
}

fn dump_node(tree: &HudTree, id: NodeId, level: usize, writer: &mut dyn Write) -> io::Result<()> {
    writeln!(
        writer,
        "{:indent$}{:?} {:?} key={:#06x} visible={} scale={} z={}",
        "",
        tree.kind(id),
        id,
        tree.full_z_offset(id),
        tree.effective_visible(id),
        tree.effective_scale(id),
        tree.effective_z_offset(id),
        indent = level * 2,
    )?;
    for child in tree.children(id) {
        dump_node(tree, child, level + 1, writer)?;
    }
    Ok(())
}
