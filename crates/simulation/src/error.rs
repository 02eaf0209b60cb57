//! Simulation error types.

use sirsim_core::EventQueueError;
use sirsim_types::{Compartment, NodeIndex};
use thiserror::Error;

/// Errors raised while configuring or running a simulation.
///
/// Every variant is local to one run: the shared contact graph is never
/// touched, so other runs on the same graph are unaffected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Rejected at construction, before any event is processed.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A transition addressed a node that was not in the expected
    /// compartment. Indicates a logic defect.
    #[error("inconsistent state at t={time}: node {node} expected {expected}, found {actual}")]
    InconsistentState {
        node: NodeIndex,
        expected: Compartment,
        actual: Compartment,
        time: f64,
    },

    #[error(transparent)]
    Queue(#[from] EventQueueError),
}

impl SimulationError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }
}
