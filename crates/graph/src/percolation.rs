//! k-core pruning and site percolation.

use crate::{ContactGraph, GraphError};
use rand::Rng;
use sirsim_types::NodeIndex;
use std::collections::VecDeque;

/// Size of the k-core of the subgraph induced by the `alive` nodes.
///
/// Nodes with fewer than `k` alive neighbours are removed repeatedly until
/// every remaining node has at least `k` remaining neighbours. `k == 0`
/// keeps every alive node.
pub fn k_core_size(graph: &ContactGraph, alive: &[bool], k: usize) -> Result<usize, GraphError> {
    Ok(k_core(graph, alive, k)?.iter().filter(|&&b| b).count())
}

/// Membership mask of the k-core of the subgraph induced by `alive`.
pub fn k_core(graph: &ContactGraph, alive: &[bool], k: usize) -> Result<Vec<bool>, GraphError> {
    let n = graph.node_count();
    if alive.len() != n {
        return Err(GraphError::LengthMismatch {
            what: "alive mask",
            expected: n,
            actual: alive.len(),
        });
    }
    if k == 0 {
        return Ok(alive.to_vec());
    }

    let mut degree = vec![0usize; n];
    let mut queue: VecDeque<NodeIndex> = VecDeque::new();
    for u in 0..n {
        if !alive[u] {
            continue;
        }
        let d = graph
            .neighbors(u as NodeIndex)
            .iter()
            .filter(|&&v| alive[v as usize])
            .count();
        degree[u] = d;
        if d < k {
            queue.push_back(u as NodeIndex);
        }
    }

    let mut in_core = alive.to_vec();
    while let Some(u) = queue.pop_front() {
        let ui = u as usize;
        if !in_core[ui] || degree[ui] >= k {
            continue;
        }
        in_core[ui] = false;
        for &v in graph.neighbors(u) {
            let vi = v as usize;
            if in_core[vi] && degree[vi] > 0 {
                degree[vi] -= 1;
                if degree[vi] < k {
                    queue.push_back(v);
                }
            }
        }
    }

    Ok(in_core)
}

/// Keep each node independently with probability `occupancy`.
///
/// Draws exactly one uniform per node, in index order.
pub fn site_percolation(graph: &ContactGraph, occupancy: f64, rng: &mut impl Rng) -> Vec<bool> {
    (0..graph.node_count())
        .map(|_| rng.gen::<f64>() < occupancy)
        .collect()
}

/// One realisation of site percolation followed by k-core pruning.
pub fn site_percolation_k_core(
    graph: &ContactGraph,
    k: usize,
    occupancy: f64,
    rng: &mut impl Rng,
) -> Result<usize, GraphError> {
    let alive = site_percolation(graph, occupancy, rng);
    k_core_size(graph, &alive, k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sirsim_core::SimRng;

    fn complete_graph(n: NodeIndex) -> ContactGraph {
        let edges: Vec<_> = (0..n)
            .flat_map(|u| (u + 1..n).map(move |v| (u, v)))
            .collect();
        ContactGraph::from_edges(n as usize, &edges).unwrap()
    }

    fn path_graph(n: NodeIndex) -> ContactGraph {
        let edges: Vec<_> = (1..n).map(|v| (v - 1, v)).collect();
        ContactGraph::from_edges(n as usize, &edges).unwrap()
    }

    fn star_graph(n: NodeIndex) -> ContactGraph {
        let edges: Vec<_> = (1..n).map(|v| (0, v)).collect();
        ContactGraph::from_edges(n as usize, &edges).unwrap()
    }

    #[test]
    fn test_complete_graph_core() {
        let g = complete_graph(5);
        let alive = vec![true; 5];
        assert_eq!(k_core_size(&g, &alive, 4).unwrap(), 5);
        assert_eq!(k_core_size(&g, &alive, 5).unwrap(), 0);
    }

    #[test]
    fn test_path_has_no_two_core() {
        let g = path_graph(6);
        let alive = vec![true; 6];
        assert_eq!(k_core_size(&g, &alive, 1).unwrap(), 6);
        assert_eq!(k_core_size(&g, &alive, 2).unwrap(), 0);
    }

    #[test]
    fn test_triangle_with_tail() {
        let g = ContactGraph::from_edges(5, &[(0, 1), (1, 2), (2, 0), (2, 3), (3, 4)]).unwrap();
        let core = k_core(&g, &[true; 5], 2).unwrap();
        assert_eq!(core, vec![true, true, true, false, false]);
    }

    #[test]
    fn test_dead_nodes_do_not_count() {
        let g = star_graph(5);
        let mut alive = vec![true; 5];
        assert_eq!(k_core_size(&g, &alive, 1).unwrap(), 5);
        alive[0] = false; // hub removed
        assert_eq!(k_core_size(&g, &alive, 1).unwrap(), 0);
        assert_eq!(k_core_size(&g, &alive, 0).unwrap(), 4);
    }

    #[test]
    fn test_mask_length_must_match() {
        let g = path_graph(3);
        let err = k_core_size(&g, &[true; 2], 1).unwrap_err();
        assert!(matches!(err, GraphError::LengthMismatch { .. }));
    }

    #[test]
    fn test_site_percolation_extremes() {
        let g = complete_graph(6);
        let mut rng = SimRng::seed_from_u64(8);
        assert_eq!(site_percolation_k_core(&g, 3, 1.0, &mut rng).unwrap(), 6);
        assert_eq!(site_percolation_k_core(&g, 1, 0.0, &mut rng).unwrap(), 0);
    }
}
