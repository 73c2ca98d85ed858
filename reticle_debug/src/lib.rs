// Copyright 2026 the Reticle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing, recording, and JSON snapshot export for reticle
//! diagnostics.
//!
//! This crate provides [`TraceSink`](reticle_core::trace::TraceSink) and
//! [`FaultSink`](reticle_core::diagnostics::FaultSink) implementations for
//! development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output,
//!   plus [`pretty::dump_tree`] for an indented view of a node tree.
//! - [`recorder::RecorderSink`]: keeps every trace event and fault in memory.
//! - [`snapshot`]: JSON export of a flattened update-accessor list and of
//!   recorded events.

pub mod pretty;
pub mod recorder;
pub mod snapshot;
