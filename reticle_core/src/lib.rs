// Copyright 2026 the Reticle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained-mode scene graph for real-time HUD rendering.
//!
//! `reticle_core` keeps a tree of HUD elements and, once per frame, flattens
//! it into an ordered list of update accessors that the host render loop
//! drives through four passes: depth test, input, layout, and draw. It is
//! `no_std` compatible (with `alloc`) and stores nodes in struct-of-arrays
//! form addressed by generational [`NodeId`](node::NodeId) handles.
//!
//! # Architecture
//!
//! ```text
//!   Host loop (cursor ray, pause flag)
//!       │
//!       ▼
//!   HudTree ──stale?──► generate_update_accessors() ──► [UpdateAccessor]
//!                                                           │
//!                 ┌─────────────────────────────────────────┘
//!                 ▼
//!   depth test ──► input ──► layout ──► draw      (Hud::run_frame)
//!        │           │          │         │
//!        └───────────┴────┬─────┴─────────┘
//!                         ▼
//!                    FaultSink (per-node hook failures)
//! ```
//!
//! **[`node`]**: Struct-of-arrays node tree with generational handles.
//! Roots, parentable nodes, and coordinate-space nodes share one store.
//! Local visibility, scale, and z-offset are set by callers; the inherited
//! baseline each node reads from its parent is refreshed through
//! [`dirty`] tracking.
//!
//! **[`order`]**: The 16-bit full z-offset codec used to sort the flattened
//! tree for input and draw dispatch.
//!
//! **[`accessor`]**: The per-node callback bundle and the fault-isolated
//! phase wrappers around each [`HudElement`](element::HudElement) hook.
//!
//! **[`frame`]**: [`Hud`](frame::Hud), the traversal driver that owns a tree,
//! its root, and the flattened accessor list.
//!
//! **[`diagnostics`]**: The [`FaultSink`](diagnostics::FaultSink) trait that
//! receives per-node hook failures.
//!
//! **[`transform`]** and **[`cursor`]**: Plane-to-world transforms and the
//! cursor world ray projected into each coordinate space.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! frame-loop instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies and
//!   converts panics raised by element hooks into reported faults.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod accessor;
pub mod cursor;
pub mod diagnostics;
pub mod dirty;
pub mod element;
pub mod error;
pub mod frame;
pub mod node;
pub mod order;
pub mod trace;
pub mod transform;
