//! Domain-specific identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a node in a contact graph.
///
/// Nodes are numbered densely `0..n`. A `u32` keeps the adjacency arrays
/// compact for graphs with millions of nodes.
pub type NodeIndex = u32;

/// Kind of a pending state-transition event.
///
/// The declaration order is part of the reproducibility contract: when two
/// events are scheduled at the same floating-point time, `Transmit` is
/// resolved before `Recover`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    /// A neighbour's transmission reaches the node.
    Transmit,
    /// The node's infectious period ends.
    Recover,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Transmit => write!(f, "Transmit"),
            EventKind::Recover => write!(f, "Recover"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transmit_orders_before_recover() {
        assert!(EventKind::Transmit < EventKind::Recover);
    }

    #[test]
    fn test_event_kind_display() {
        assert_eq!(EventKind::Transmit.to_string(), "Transmit");
        assert_eq!(EventKind::Recover.to_string(), "Recover");
    }
}
