//! Power-law configuration model restricted to simple graphs.

use super::edge_key;
use crate::{ContactGraph, GraphError};
use rand::Rng;
use sirsim_types::NodeIndex;
use std::collections::HashSet;
use tracing::{debug, trace};

/// Restarts allowed before giving up on a degree sequence.
const MAX_RESTARTS: usize = 10_000;

/// Lower bound on the per-attempt backtracking budget.
const MIN_BACKTRACK_BUDGET: usize = 100;

/// Simple graph whose degrees follow `p(k) ∝ k^-exponent`, `k ∈ [1, n-1]`.
///
/// Degrees are sampled first and the total is made even by nudging one node.
/// Edges are then matched greedily: the node with the most remaining stubs
/// (first one on ties) is joined to a uniformly random node that still has
/// stubs and is neither itself nor an existing neighbour. When no legal
/// partner exists the most recent edges are undone, up to `max(100, n)`
/// times per attempt; after that the attempt restarts from the same degree
/// sequence.
pub fn power_law_configuration(
    n: usize,
    exponent: f64,
    rng: &mut impl Rng,
) -> Result<ContactGraph, GraphError> {
    if n == 0 {
        return Err(GraphError::InvalidParameter(
            "node count must be positive".into(),
        ));
    }
    if !(exponent.is_finite() && exponent > 0.0) {
        return Err(GraphError::InvalidParameter(format!(
            "power-law exponent must be positive, got {exponent}"
        )));
    }

    let degrees = sample_degrees(n, exponent, rng)?;
    let stub_total: usize = degrees.iter().sum();
    let m = stub_total / 2;
    let budget = MIN_BACKTRACK_BUDGET.max(n);

    for attempt in 0..MAX_RESTARTS {
        if let Some(edges) = match_stubs(&degrees, m, budget, rng) {
            debug!(n, exponent, edges = m, attempt, "Generated configuration-model graph");
            return ContactGraph::from_edges(n, &edges);
        }
        trace!(attempt, "Configuration matching stalled, restarting");
    }

    Err(GraphError::GenerationFailed(format!(
        "no simple graph found after {MAX_RESTARTS} attempts (n={n}, exponent={exponent})"
    )))
}

/// Sample a degree sequence with an even sum.
fn sample_degrees(n: usize, exponent: f64, rng: &mut impl Rng) -> Result<Vec<usize>, GraphError> {
    let k_max = (n - 1).max(1);

    // cdf[i] = P(K <= i + 1)
    let weights: Vec<f64> = (1..=k_max).map(|k| (k as f64).powf(-exponent)).collect();
    let z: f64 = weights.iter().sum();
    let mut acc = 0.0;
    let cdf: Vec<f64> = weights
        .iter()
        .map(|w| {
            acc += w / z;
            acc
        })
        .collect();

    let mut degrees: Vec<usize> = (0..n)
        .map(|_| {
            let u: f64 = rng.gen();
            (cdf.partition_point(|&c| c < u) + 1).min(k_max)
        })
        .collect();

    if degrees.iter().sum::<usize>() % 2 == 1 {
        let adjust = degrees
            .iter()
            .position(|&d| d < k_max)
            .map(|i| (i, true))
            .or_else(|| degrees.iter().position(|&d| d > 1).map(|i| (i, false)));
        match adjust {
            Some((i, true)) => degrees[i] += 1,
            Some((i, false)) => degrees[i] -= 1,
            None => {
                return Err(GraphError::GenerationFailed(format!(
                    "cannot make the degree sum even for n={n}"
                )))
            }
        }
    }

    Ok(degrees)
}

/// One greedy matching attempt. Returns `None` if it stalls.
fn match_stubs(
    degrees: &[usize],
    m: usize,
    mut backtrack_budget: usize,
    rng: &mut impl Rng,
) -> Option<Vec<(NodeIndex, NodeIndex)>> {
    let n = degrees.len();
    let mut remaining = degrees.to_vec();
    let mut edges: Vec<(NodeIndex, NodeIndex)> = Vec::with_capacity(m);
    let mut present: HashSet<(NodeIndex, NodeIndex)> = HashSet::with_capacity(m * 2);
    let mut candidates: Vec<NodeIndex> = Vec::with_capacity(n);

    while edges.len() < m {
        // Node with the most remaining stubs, first on ties.
        let mut u = None;
        let mut most = 0;
        for (i, &r) in remaining.iter().enumerate() {
            if r > most {
                most = r;
                u = Some(i as NodeIndex);
            }
        }
        let u = u?;

        candidates.clear();
        candidates.extend(
            (0..n as NodeIndex)
                .filter(|&v| v != u && remaining[v as usize] > 0)
                .filter(|&v| !present.contains(&edge_key(u, v))),
        );

        if candidates.is_empty() {
            if backtrack_budget == 0 {
                return None;
            }
            let (a, b) = edges.pop()?;
            present.remove(&edge_key(a, b));
            remaining[a as usize] += 1;
            remaining[b as usize] += 1;
            backtrack_budget -= 1;
            continue;
        }

        let v = candidates[rng.gen_range(0..candidates.len())];
        present.insert(edge_key(u, v));
        remaining[u as usize] -= 1;
        remaining[v as usize] -= 1;
        edges.push((u, v));
    }

    Some(edges)
}
