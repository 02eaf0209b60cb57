//! Fixture graphs with known structure for tests across the workspace.
//!
//! All builders panic on invalid input; they are only meant for tests.

use sirsim_graph::{ContactGraph, NodeIndex};

fn build(n: NodeIndex, edges: &[(NodeIndex, NodeIndex)]) -> ContactGraph {
    ContactGraph::from_edges(n as usize, edges).expect("fixture edges are valid")
}

/// `0 - 1 - ... - (n-1)`.
pub fn path_graph(n: NodeIndex) -> ContactGraph {
    let edges: Vec<_> = (1..n).map(|v| (v - 1, v)).collect();
    build(n, &edges)
}

/// A path closed into a cycle. Needs `n >= 3`.
pub fn ring_graph(n: NodeIndex) -> ContactGraph {
    assert!(n >= 3, "a ring needs at least 3 nodes");
    let mut edges: Vec<_> = (1..n).map(|v| (v - 1, v)).collect();
    edges.push((n - 1, 0));
    build(n, &edges)
}

/// Hub `0` joined to every other node.
pub fn star_graph(n: NodeIndex) -> ContactGraph {
    let edges: Vec<_> = (1..n).map(|v| (0, v)).collect();
    build(n, &edges)
}

/// Every pair of nodes connected.
pub fn complete_graph(n: NodeIndex) -> ContactGraph {
    let edges: Vec<_> = (0..n)
        .flat_map(|u| (u + 1..n).map(move |v| (u, v)))
        .collect();
    build(n, &edges)
}

/// `n` nodes and no edges.
pub fn isolated_nodes(n: NodeIndex) -> ContactGraph {
    build(n, &[])
}

/// Two disjoint paths of `half` nodes each: `0..half` and `half..2*half`.
pub fn two_components(half: NodeIndex) -> ContactGraph {
    let mut edges: Vec<_> = (1..half).map(|v| (v - 1, v)).collect();
    edges.extend((half + 1..2 * half).map(|v| (v - 1, v)));
    build(2 * half, &edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_shapes() {
        assert_eq!(path_graph(4).edge_count(), 3);
        assert_eq!(ring_graph(5).edge_count(), 5);
        assert_eq!(star_graph(6).degree(0), 5);
        assert_eq!(complete_graph(4).edge_count(), 6);
        assert_eq!(isolated_nodes(3).edge_count(), 0);

        let g = two_components(3);
        assert_eq!(g.node_count(), 6);
        assert_eq!(g.edge_count(), 4);
        assert!(g.neighbors(2).iter().all(|&v| v < 3));
    }
}
