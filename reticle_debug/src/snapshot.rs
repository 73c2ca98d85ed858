// Copyright 2026 the Reticle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON export of update-accessor lists and recorded events.

use std::io::{self, Write};

use serde_json::{Value, json};

use reticle_core::accessor::UpdateAccessor;
use reticle_core::node::NodeId;

use crate::recorder::RecordedEvent;

/// Converts an update-accessor list into a JSON array, one object per
/// accessor in list order.
#[must_use]
pub fn accessors_json(accessors: &[UpdateAccessor]) -> Value {
    Value::Array(
        accessors
            .iter()
            .map(|acc| {
                json!({
                    "node": node_json(acc.node()),
                    "key": acc.full_z_offset(),
                    "depth": acc.depth(),
                    "space": acc.space().map(node_json),
                })
            })
            .collect(),
    )
}

/// Writes an update-accessor list as pretty-printed JSON.
pub fn write_accessors(accessors: &[UpdateAccessor], writer: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(writer, &accessors_json(accessors))?;
    Ok(())
}

/// Converts recorded trace events into a JSON array.
#[must_use]
pub fn events_json(events: &[RecordedEvent]) -> Value {
    Value::Array(events.iter().map(event_json).collect())
}

fn event_json(event: &RecordedEvent) -> Value {
    match event {
        RecordedEvent::Rebuild(e) => json!({
            "event": "rebuild",
            "frame": e.frame_index,
            "nodes": e.node_count,
        }),
        RecordedEvent::PhaseBegin(e) => json!({
            "event": "phase_begin",
            "frame": e.frame_index,
            "phase": e.phase.name(),
        }),
        RecordedEvent::PhaseEnd(e) => json!({
            "event": "phase_end",
            "frame": e.frame_index,
            "phase": e.phase.name(),
            "ran": e.ran,
            "skipped": e.skipped,
            "faulted": e.faulted,
        }),
        RecordedEvent::Fault(e) => json!({
            "event": "fault",
            "frame": e.frame_index,
            "node": node_json(e.node),
            "phase": e.phase.name(),
        }),
        RecordedEvent::FrameSummary(s) => json!({
            "event": "summary",
            "frame": s.frame_index,
            "nodes": s.node_count,
            "rebuilt": s.rebuilt,
            "faults": s.total_faults(),
        }),
    }
}

fn node_json(id: NodeId) -> Value {
    json!({ "index": id.index(), "generation": id.generation() })
}
