// Copyright 2026 the Reticle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing for the frame loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! the [`Hud`](crate::frame::Hud) driver calls at each stage of a frame. All
//! method bodies default to no-ops, so implementing only the events you care
//! about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! [`FrameSummaryBuilder`] tallies per-phase outcomes during a frame and
//! produces a [`FrameSummary`] at the end.

use crate::accessor::{Phase, PhaseOutcome};
use crate::node::NodeId;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted after the update-accessor list is regenerated.
#[derive(Clone, Copy, Debug)]
pub struct RebuildEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Number of accessors in the new list.
    pub node_count: usize,
}

/// Marks the beginning of a phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is starting.
    pub phase: Phase,
}

/// Marks the end of a phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is ending.
    pub phase: Phase,
    /// Hooks that ran successfully.
    pub ran: u32,
    /// Accessors whose hook was not invoked.
    pub skipped: u32,
    /// Hooks that failed.
    pub faulted: u32,
}

/// Emitted when a hook fails, after the fault has been reported.
#[derive(Clone, Copy, Debug)]
pub struct FaultEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// The node whose hook failed.
    pub node: NodeId,
    /// The phase the hook ran in.
    pub phase: Phase,
}

/// Per-frame outcome counts produced by [`FrameSummaryBuilder`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSummary {
    /// Frame counter.
    pub frame_index: u64,
    /// Number of accessors driven this frame.
    pub node_count: usize,
    /// Whether the accessor list was regenerated this frame.
    pub rebuilt: bool,
    /// Hooks that ran, indexed in [`Phase::ALL`] order.
    pub ran: [u32; 4],
    /// Accessors skipped, indexed in [`Phase::ALL`] order.
    pub skipped: [u32; 4],
    /// Hooks that failed, indexed in [`Phase::ALL`] order.
    pub faulted: [u32; 4],
}

impl FrameSummary {
    /// Hooks that ran in `phase`.
    #[must_use]
    pub const fn ran(&self, phase: Phase) -> u32 {
        self.ran[phase.index()]
    }

    /// Accessors skipped in `phase`.
    #[must_use]
    pub const fn skipped(&self, phase: Phase) -> u32 {
        self.skipped[phase.index()]
    }

    /// Hooks that failed in `phase`.
    #[must_use]
    pub const fn faulted(&self, phase: Phase) -> u32 {
        self.faulted[phase.index()]
    }

    /// Hooks that failed across all phases.
    #[must_use]
    pub fn total_faults(&self) -> u32 {
        self.faulted.iter().sum()
    }
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the frame loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after the update-accessor list is regenerated.
    fn on_rebuild(&mut self, e: &RebuildEvent) {
        _ = e;
    }

    /// Called at the beginning of a phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called when a hook fails.
    fn on_fault(&mut self, e: &FaultEvent) {
        _ = e;
    }

    /// Called with the per-frame summary.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`RebuildEvent`].
    #[inline]
    pub fn rebuild(&mut self, e: &RebuildEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_rebuild(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FaultEvent`].
    #[inline]
    pub fn fault(&mut self, e: &FaultEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_fault(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameSummary`].
    #[inline]
    pub fn frame_summary(&mut self, s: &FrameSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_frame_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }
}

// ---------------------------------------------------------------------------
// FrameSummaryBuilder
// ---------------------------------------------------------------------------

/// Tallies phase outcomes during a frame and produces a [`FrameSummary`].
#[derive(Debug)]
pub struct FrameSummaryBuilder {
    summary: FrameSummary,
}

impl FrameSummaryBuilder {
    /// Starts building a summary for the given frame.
    #[must_use]
    pub fn new(frame_index: u64) -> Self {
        Self {
            summary: FrameSummary {
                frame_index,
                ..FrameSummary::default()
            },
        }
    }

    /// Records that the accessor list was regenerated.
    pub fn set_rebuilt(&mut self, rebuilt: bool) {
        self.summary.rebuilt = rebuilt;
    }

    /// Records the number of accessors driven this frame.
    pub fn set_node_count(&mut self, count: usize) {
        self.summary.node_count = count;
    }

    /// Records one accessor outcome.
    pub fn record(&mut self, phase: Phase, outcome: PhaseOutcome) {
        let i = phase.index();
        match outcome {
            PhaseOutcome::Ran => self.summary.ran[i] += 1,
            PhaseOutcome::Skipped => self.summary.skipped[i] += 1,
            PhaseOutcome::Faulted => self.summary.faulted[i] += 1,
        }
    }

    /// Builds the end-of-phase event for `phase` from the tallies so far.
    #[must_use]
    pub fn phase_end_event(&self, phase: Phase) -> PhaseEndEvent {
        PhaseEndEvent {
            frame_index: self.summary.frame_index,
            phase,
            ran: self.summary.ran(phase),
            skipped: self.summary.skipped(phase),
            faulted: self.summary.faulted(phase),
        }
    }

    /// Consumes the builder and produces the final [`FrameSummary`].
    #[must_use]
    pub fn finish(self) -> FrameSummary {
        self.summary
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_rebuild(&RebuildEvent {
            frame_index: 0,
            node_count: 3,
        });
        sink.on_frame_summary(&FrameSummary::default());
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index: 1,
            phase: Phase::Draw,
        });
        tracer.frame_summary(&FrameSummary::default());
    }

    #[test]
    fn summary_builder_tallies_outcomes() {
        let mut builder = FrameSummaryBuilder::new(7);
        builder.set_rebuilt(true);
        builder.set_node_count(3);
        builder.record(Phase::Draw, PhaseOutcome::Ran);
        builder.record(Phase::Draw, PhaseOutcome::Faulted);
        builder.record(Phase::Draw, PhaseOutcome::Skipped);
        builder.record(Phase::Input, PhaseOutcome::Skipped);

        let end = builder.phase_end_event(Phase::Draw);
        assert_eq!((end.ran, end.skipped, end.faulted), (1, 1, 1));

        let summary = builder.finish();
        assert_eq!(summary.frame_index, 7);
        assert!(summary.rebuilt);
        assert_eq!(summary.node_count, 3);
        assert_eq!(summary.skipped(Phase::Input), 1);
        assert_eq!(summary.ran(Phase::Layout), 0);
        assert_eq!(summary.total_faults(), 1);
    }

    #[test]
    fn summary_builder_empty_frame_is_zero() {
        let summary = FrameSummaryBuilder::new(0).finish();
        assert_eq!(summary, FrameSummary::default());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            phases: Vec<Phase>,
        }
        impl TraceSink for RecordingSink {
            fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
                self.phases.push(e.phase);
            }
        }

        let mut sink = RecordingSink { phases: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index: 0,
            phase: Phase::Layout,
        });
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.phases, &[Phase::Layout]);
    }
}
