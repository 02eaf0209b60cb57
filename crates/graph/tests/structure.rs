//! Structural properties of generated graphs.

use sirsim_core::SimRng;
use sirsim_graph::percolation::{k_core_size, site_percolation_k_core};
use sirsim_graph::topology::{erdos_renyi, erdos_renyi_mean_degree, power_law_configuration};
use sirsim_graph::ContactGraph;
use sirsim_test_helpers::{complete_graph, ring_graph, two_components};

/// Every arc must have a matching reverse arc and degrees must equal arc ranges.
fn assert_csr_consistent(g: &ContactGraph) {
    for u in 0..g.node_count() as u32 {
        assert_eq!(g.degree(u), g.arcs(u).len());
        for arc in g.arcs(u) {
            assert_eq!(g.source(arc), u);
            let back = g.reverse(arc);
            assert_eq!(g.head(back), u);
            assert_eq!(g.source(back), g.head(arc));
        }
    }
}

#[test]
fn test_generated_graphs_are_consistent() {
    let mut rng = SimRng::seed_from_u64(2024);
    assert_csr_consistent(&erdos_renyi(400, 0.02, &mut rng).unwrap());
    assert_csr_consistent(&erdos_renyi_mean_degree(400, 6.0, &mut rng).unwrap());
    assert_csr_consistent(&power_law_configuration(300, 2.5, &mut rng).unwrap());
}

#[test]
fn test_edgelist_round_trip_preserves_edges() {
    let mut rng = SimRng::seed_from_u64(77);
    let g = erdos_renyi_mean_degree(200, 4.0, &mut rng).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/edgelist.txt");
    g.save_edgelist(&path).unwrap();
    let loaded = ContactGraph::load_edgelist(&path, Some(g.node_count())).unwrap();

    let mut original: Vec<_> = g.edges().collect();
    let mut reread: Vec<_> = loaded.edges().collect();
    original.sort_unstable();
    reread.sort_unstable();
    assert_eq!(original, reread);
}

#[test]
fn test_ring_is_its_own_two_core() {
    let g = ring_graph(10);
    assert_eq!(k_core_size(&g, &[true; 10], 2).unwrap(), 10);
    assert_eq!(k_core_size(&g, &[true; 10], 3).unwrap(), 0);
}

#[test]
fn test_components_prune_independently() {
    let g = two_components(4);
    let mut alive = vec![true; 8];
    alive[1] = false;
    // Removing an interior node splits the first path but leaves the second intact.
    assert_eq!(k_core_size(&g, &alive, 1).unwrap(), 7);
}

#[test]
fn test_percolation_core_shrinks_with_occupancy() {
    let g = complete_graph(30);
    let full = site_percolation_k_core(&g, 5, 1.0, &mut SimRng::seed_from_u64(1)).unwrap();
    let sparse = site_percolation_k_core(&g, 5, 0.1, &mut SimRng::seed_from_u64(1)).unwrap();
    assert_eq!(full, 30);
    assert!(sparse < full);
}
