//! Random graph generators.
//!
//! Every generator takes its randomness as `&mut impl Rng`, so callers decide
//! the stream (typically a `SimRng` seeded per batch) and the same stream
//! always produces the same graph.

mod configuration;
mod erdos_renyi;

pub use configuration::power_law_configuration;
pub use erdos_renyi::{erdos_renyi, erdos_renyi_mean_degree};

use sirsim_types::NodeIndex;

/// Canonical key of an undirected edge.
fn edge_key(u: NodeIndex, v: NodeIndex) -> (NodeIndex, NodeIndex) {
    if u < v {
        (u, v)
    } else {
        (v, u)
    }
}

/// Number of distinct undirected pairs on `n` nodes.
fn max_edges(n: usize) -> u64 {
    let n = n as u64;
    n * n.saturating_sub(1) / 2
}
