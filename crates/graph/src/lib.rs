//! Contact graphs for epidemic simulations.
//!
//! A [`ContactGraph`] is an immutable, undirected, simple graph stored in
//! compressed sparse row form: every node owns a contiguous half-open range
//! of directed arcs, and each arc knows its head, its source and its reverse
//! arc. Graphs are built once and then shared read-only by any number of
//! concurrent simulation runs.
//!
//! # Modules
//!
//! - [`topology`]: Erdős–Rényi and power-law configuration-model generators
//! - [`percolation`]: k-core pruning and site percolation
//! - edge-list I/O lives on [`ContactGraph`] itself

mod edgelist;
mod error;
mod graph;
pub mod percolation;
pub mod topology;

pub use error::GraphError;
pub use graph::ContactGraph;
pub use sirsim_types::NodeIndex;
