//! Error types for graph construction and analysis.

use sirsim_types::NodeIndex;
use thiserror::Error;

/// Errors raised while building, generating, reading or analysing a graph.
///
/// A failure is local to the graph being built; existing graphs are immutable
/// and never affected.
#[derive(Debug, Error)]
pub enum GraphError {
    /// An edge endpoint lies outside `[0, n)`.
    #[error("Invalid edge ({u}, {v}): endpoints must lie in [0, {n})")]
    InvalidEdge { u: u64, v: u64, n: usize },

    /// An edge connects a node to itself.
    #[error("Self-loop on node {node}")]
    SelfLoop { node: NodeIndex },

    /// The same undirected edge appears more than once.
    #[error("Duplicate edge ({u}, {v})")]
    DuplicateEdge { u: NodeIndex, v: NodeIndex },

    /// Two parallel inputs disagree in length.
    #[error("{what} length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A generator or analysis parameter is out of range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A randomized generator gave up after exhausting its retry budget.
    #[error("Graph generation failed: {0}")]
    GenerationFailed(String),

    /// A line of an edge-list file could not be parsed.
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Reading or writing an edge list failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
