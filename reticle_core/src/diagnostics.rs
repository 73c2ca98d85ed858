// Copyright 2026 the Reticle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fault reporting for per-node hook failures.
//!
//! When an element hook returns an error (or, with the `std` feature,
//! panics), the fault boundary packages it as a [`Fault`] and hands it to a
//! [`FaultSink`]. Sinks are infallible: reporting never interrupts the frame.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::accessor::Phase;
use crate::node::NodeId;

/// A hook failure caught by the fault boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fault {
    /// The node whose hook failed.
    pub node: NodeId,
    /// The phase the hook ran in.
    pub phase: Phase,
    /// The error or panic message.
    pub message: String,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} faulted in {}: {}", self.node, self.phase, self.message)
    }
}

/// Receives faults from the fault boundary.
pub trait FaultSink {
    /// Records one fault. Must not panic.
    fn report(&mut self, fault: &Fault);
}

impl<S: FaultSink + ?Sized> FaultSink for &mut S {
    fn report(&mut self, fault: &Fault) {
        (**self).report(fault);
    }
}

/// A [`FaultSink`] that forwards every fault to [`log::warn!`].
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl FaultSink for LogSink {
    fn report(&mut self, fault: &Fault) {
        log::warn!("{fault}");
    }
}

/// A [`FaultSink`] that keeps every fault it receives.
#[derive(Clone, Debug, Default)]
pub struct FaultLog {
    faults: Vec<Fault>,
}

impl FaultLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Faults received so far, oldest first.
    #[must_use]
    pub fn faults(&self) -> &[Fault] {
        &self.faults
    }

    /// Number of faults received.
    #[must_use]
    pub fn len(&self) -> usize {
        self.faults.len()
    }

    /// Whether no fault has been received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faults.is_empty()
    }

    /// Number of faults reported for `node`.
    #[must_use]
    pub fn count_for(&self, node: NodeId) -> usize {
        self.faults.iter().filter(|f| f.node == node).count()
    }

    /// Forgets every recorded fault.
    pub fn clear(&mut self) {
        self.faults.clear();
    }
}

impl FaultSink for FaultLog {
    fn report(&mut self, fault: &Fault) {
        self.faults.push(fault.clone());
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;
    use crate::node::HudTree;

    #[test]
    fn fault_log_records_and_counts() {
        let mut tree = HudTree::new();
        let a = tree.create_node();
        let b = tree.create_node();
        let mut log = FaultLog::new();
        for (node, phase) in [(a, Phase::Draw), (b, Phase::Input), (a, Phase::Layout)] {
            log.report(&Fault {
                node,
                phase,
                message: "boom".to_string(),
            });
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.count_for(a), 2);
        assert_eq!(log.faults()[1].phase, Phase::Input);
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn sink_by_mut_reference() {
        fn report_into(mut sink: impl FaultSink, fault: &Fault) {
            sink.report(fault);
        }
        let mut tree = HudTree::new();
        let fault = Fault {
            node: tree.create_node(),
            phase: Phase::DepthTest,
            message: "late".to_string(),
        };
        let mut log = FaultLog::new();
        report_into(&mut log, &fault);
        assert_eq!(log.faults(), &[fault]);
    }

    #[test]
    fn display_names_node_and_phase() {
        let mut tree = HudTree::new();
        let fault = Fault {
            node: tree.create_node(),
            phase: Phase::Draw,
            message: "no texture".to_string(),
        };
        assert_eq!(fault.to_string(), "NodeId(0@gen0) faulted in draw: no texture");
    }
}
