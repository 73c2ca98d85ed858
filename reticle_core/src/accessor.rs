// Copyright 2026 the Reticle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Update accessors and the fault-isolated phase wrappers.
//!
//! An [`UpdateAccessor`] is the per-node bundle produced by
//! [`HudTree::generate_update_accessors`]: the node handle, its cached full
//! z-offset, its tree depth, and its resolved coordinate space. Its four
//! phase methods invoke the node's [`HudElement`] hooks through one wrapper
//! that:
//!
//! 1. skips every hook while the tree is paused, or once the node is
//!    destroyed;
//! 2. gates input and draw on the node's effective visibility, evaluated
//!    when the phase fires;
//! 3. refreshes the node's ordering key, space, transform, and cursor
//!    projection before its layout hook;
//! 4. catches a failing hook, reports it to a [`FaultSink`], and returns so
//!    the rest of the frame can proceed.

use alloc::string::{String, ToString};
use core::fmt;

use crate::diagnostics::{Fault, FaultSink};
use crate::element::{ElementCx, HookResult, HudElement};
use crate::node::{HudTree, NodeId};

/// One of the four per-frame passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Cursor depth comparison between coordinate spaces.
    DepthTest,
    /// Input handling, topmost first.
    Input,
    /// Layout, parents before children.
    Layout,
    /// Draw submission, back to front.
    Draw,
}

impl Phase {
    /// Every phase in frame order.
    pub const ALL: [Self; 4] = [Self::DepthTest, Self::Input, Self::Layout, Self::Draw];

    /// Short lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DepthTest => "depth_test",
            Self::Input => "input",
            Self::Layout => "layout",
            Self::Draw => "draw",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::DepthTest => 0,
            Self::Input => 1,
            Self::Layout => 2,
            Self::Draw => 3,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What happened when an accessor ran one phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseOutcome {
    /// The hook ran and returned `Ok`.
    Ran,
    /// The hook was not invoked: paused, hidden, destroyed, or no element.
    Skipped,
    /// The hook failed and the fault was reported.
    Faulted,
}

/// The per-node bundle of the flattened update list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateAccessor {
    node: NodeId,
    full_z_offset: u16,
    depth: u8,
    space: Option<NodeId>,
}

impl UpdateAccessor {
    pub(crate) const fn new(
        node: NodeId,
        full_z_offset: u16,
        depth: u8,
        space: Option<NodeId>,
    ) -> Self {
        Self {
            node,
            full_z_offset,
            depth,
            space,
        }
    }

    /// The node this accessor drives.
    #[must_use]
    pub const fn node(&self) -> NodeId {
        self.node
    }

    /// Full z-offset as of generation or the node's last layout.
    #[must_use]
    pub const fn full_z_offset(&self) -> u16 {
        self.full_z_offset
    }

    /// Depth below the node the list was generated from.
    #[must_use]
    pub const fn depth(&self) -> u8 {
        self.depth
    }

    /// The space node the node renders in, `None` for the root space.
    #[must_use]
    pub const fn space(&self) -> Option<NodeId> {
        self.space
    }

    /// Runs the depth-test hook.
    pub fn depth_test(&self, tree: &mut HudTree, sink: &mut dyn FaultSink) -> PhaseOutcome {
        tree.run_hook(self.node, Phase::DepthTest, sink)
    }

    /// Runs the input hook if the node is effectively visible.
    pub fn input(&self, tree: &mut HudTree, sink: &mut dyn FaultSink) -> PhaseOutcome {
        tree.run_hook(self.node, Phase::Input, sink)
    }

    /// Refreshes the node's ordering key and space, then runs the layout
    /// hook. The accessor picks up the refreshed key and space.
    pub fn layout(&mut self, tree: &mut HudTree, sink: &mut dyn FaultSink) -> PhaseOutcome {
        let outcome = tree.run_hook(self.node, Phase::Layout, sink);
        if tree.is_alive(self.node) {
            self.full_z_offset = tree.full_z_offset(self.node);
            self.space = tree.resolved_space(self.node.idx);
        }
        outcome
    }

    /// Runs the draw hook if the node is effectively visible.
    pub fn draw(&self, tree: &mut HudTree, sink: &mut dyn FaultSink) -> PhaseOutcome {
        tree.run_hook(self.node, Phase::Draw, sink)
    }

    /// Runs `phase`.
    pub fn run(&mut self, phase: Phase, tree: &mut HudTree, sink: &mut dyn FaultSink) -> PhaseOutcome {
        match phase {
            Phase::DepthTest => self.depth_test(tree, sink),
            Phase::Input => self.input(tree, sink),
            Phase::Layout => self.layout(tree, sink),
            Phase::Draw => self.draw(tree, sink),
        }
    }
}

impl HudTree {
    fn run_hook(&mut self, id: NodeId, phase: Phase, sink: &mut dyn FaultSink) -> PhaseOutcome {
        let idx = id.idx as usize;
        if self.paused || idx >= self.generation.len() || self.generation[idx] != id.generation {
            return PhaseOutcome::Skipped;
        }
        match phase {
            Phase::DepthTest => {}
            Phase::Input | Phase::Draw => {
                // An earlier hook in this pass may have changed visibility.
                self.refresh_inherited();
                if !self.chain_visible(id.idx) {
                    return PhaseOutcome::Skipped;
                }
            }
            Phase::Layout => {
                self.refresh_inherited();
                self.refresh_order(id.idx);
                self.prepare_space(id.idx);
            }
        }

        // The element is moved out for the call so the hook can borrow the
        // tree mutably.
        let Some(mut element) = self.elements[idx].take() else {
            return PhaseOutcome::Skipped;
        };
        let result = {
            let mut cx = ElementCx::new(self, id);
            guarded_call(element.as_mut(), phase, &mut cx)
        };
        if self.generation[idx] == id.generation && self.elements[idx].is_none() {
            self.elements[idx] = Some(element);
        }

        match result {
            Ok(()) => PhaseOutcome::Ran,
            Err(message) => {
                sink.report(&Fault {
                    node: id,
                    phase,
                    message,
                });
                PhaseOutcome::Faulted
            }
        }
    }
}

fn dispatch(element: &mut dyn HudElement, phase: Phase, cx: &mut ElementCx<'_>) -> HookResult {
    match phase {
        Phase::DepthTest => element.depth_test(cx),
        Phase::Input => element.handle_input(cx),
        Phase::Layout => element.layout(cx),
        Phase::Draw => element.draw(cx),
    }
}

#[cfg(feature = "std")]
fn guarded_call(
    element: &mut dyn HudElement,
    phase: Phase,
    cx: &mut ElementCx<'_>,
) -> Result<(), String> {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    match catch_unwind(AssertUnwindSafe(|| dispatch(element, phase, cx))) {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(payload) => Err(panic_message(payload)),
    }
}

#[cfg(not(feature = "std"))]
fn guarded_call(
    element: &mut dyn HudElement,
    phase: Phase,
    cx: &mut ElementCx<'_>,
) -> Result<(), String> {
    dispatch(element, phase, cx).map_err(|e| e.to_string())
}

#[cfg(feature = "std")]
fn panic_message(payload: alloc::boxed::Box<dyn core::any::Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(s) => alloc::format!("panicked: {s}"),
        Err(payload) => match payload.downcast_ref::<&'static str>() {
            Some(s) => alloc::format!("panicked: {s}"),
            None => "panicked".to_string(),
        },
    }
}
