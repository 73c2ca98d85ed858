// Copyright 2026 the Reticle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory trace recording.
//!
//! [`RecorderSink`] implements [`TraceSink`] and keeps every event it
//! receives, in order. Recorded events can be inspected directly or exported
//! with [`snapshot::events_json`](crate::snapshot::events_json).

use reticle_core::trace::{
    FaultEvent, FrameSummary, PhaseBeginEvent, PhaseEndEvent, RebuildEvent, TraceSink,
};

/// A recorded trace event.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// See [`TraceSink::on_rebuild`].
    Rebuild(RebuildEvent),
    /// See [`TraceSink::on_phase_begin`].
    PhaseBegin(PhaseBeginEvent),
    /// See [`TraceSink::on_phase_end`].
    PhaseEnd(PhaseEndEvent),
    /// See [`TraceSink::on_fault`].
    Fault(FaultEvent),
    /// See [`TraceSink::on_frame_summary`].
    FrameSummary(FrameSummary),
}

/// A [`TraceSink`] that records every event in memory.
#[derive(Clone, Debug, Default)]
pub struct RecorderSink {
    events: Vec<RecordedEvent>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded so far, oldest first.
    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Frame summaries recorded so far.
    pub fn summaries(&self) -> impl Iterator<Item = &FrameSummary> + '_ {
        self.events.iter().filter_map(|e| match e {
            RecordedEvent::FrameSummary(s) => Some(s),
            _ => None,
        })
    }

    /// Forgets every recorded event.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl TraceSink for RecorderSink {
    fn on_rebuild(&mut self, e: &RebuildEvent) {
        self.events.push(RecordedEvent::Rebuild(*e));
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.events.push(RecordedEvent::PhaseBegin(*e));
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.events.push(RecordedEvent::PhaseEnd(*e));
    }

    fn on_fault(&mut self, e: &FaultEvent) {
        self.events.push(RecordedEvent::Fault(*e));
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.events.push(RecordedEvent::FrameSummary(*s));
    }
}
