//! Erdős–Rényi random graphs.

use super::{edge_key, max_edges};
use crate::{ContactGraph, GraphError};
use rand::Rng;
use sirsim_types::NodeIndex;
use std::collections::HashSet;
use tracing::debug;

/// `G(n, p)`: every pair of distinct nodes is connected independently with
/// probability `p`.
///
/// Gaps between successive present pairs are drawn geometrically, so the
/// cost is O(n + m) rather than O(n²).
pub fn erdos_renyi(n: usize, p: f64, rng: &mut impl Rng) -> Result<ContactGraph, GraphError> {
    if n == 0 {
        return Err(GraphError::InvalidParameter(
            "node count must be positive".into(),
        ));
    }
    if !(0.0..=1.0).contains(&p) {
        return Err(GraphError::InvalidParameter(format!(
            "edge probability must be in [0, 1], got {p}"
        )));
    }

    let mut edges: Vec<(NodeIndex, NodeIndex)> = Vec::new();
    if p >= 1.0 {
        for v in 1..n {
            for w in 0..v {
                edges.push((w as NodeIndex, v as NodeIndex));
            }
        }
    } else if p > 0.0 && n > 1 {
        let pairs = max_edges(n) as f64;
        let log_q = (1.0 - p).ln();
        // Walk the lower triangle (w < v) row by row; w is the column.
        let mut v: usize = 1;
        let mut w: i64 = -1;
        loop {
            let r = 1.0 - rng.gen::<f64>();
            let skip = (r.ln() / log_q).floor();
            if skip >= pairs {
                break;
            }
            w += 1 + skip as i64;
            while v < n && w >= v as i64 {
                w -= v as i64;
                v += 1;
            }
            if v >= n {
                break;
            }
            edges.push((w as NodeIndex, v as NodeIndex));
        }
    }

    debug!(n, p, edges = edges.len(), "Generated G(n, p) graph");
    ContactGraph::from_edges(n, &edges)
}

/// Erdős–Rényi graph with a fixed number of edges chosen for a target mean
/// degree.
///
/// Exactly `floor(floor(n * mean_degree) / 2)` distinct edges are drawn
/// uniformly, rejecting self-loops and repeats.
pub fn erdos_renyi_mean_degree(
    n: usize,
    mean_degree: f64,
    rng: &mut impl Rng,
) -> Result<ContactGraph, GraphError> {
    if n == 0 {
        return Err(GraphError::InvalidParameter(
            "node count must be positive".into(),
        ));
    }
    if !mean_degree.is_finite() || mean_degree < 0.0 {
        return Err(GraphError::InvalidParameter(format!(
            "mean degree must be a non-negative number, got {mean_degree}"
        )));
    }

    let stubs = (n as f64 * mean_degree).floor() as u64;
    let m = stubs / 2;
    if m > max_edges(n) {
        return Err(GraphError::InvalidParameter(format!(
            "mean degree {mean_degree} needs {m} edges but only {} pairs exist on {n} nodes",
            max_edges(n)
        )));
    }

    let m = m as usize;
    let mut selected: HashSet<(NodeIndex, NodeIndex)> = HashSet::with_capacity(m);
    let mut edges = Vec::with_capacity(m);
    while edges.len() < m {
        let u = rng.gen_range(0..n) as NodeIndex;
        let v = rng.gen_range(0..n) as NodeIndex;
        if u == v {
            continue;
        }
        if selected.insert(edge_key(u, v)) {
            edges.push((u, v));
        }
    }

    debug!(n, mean_degree, edges = m, "Generated fixed-edge ER graph");
    ContactGraph::from_edges(n, &edges)
}
