//! Invariants every SIR/SAR run must satisfy.

use sirsim_core::SimRng;
use sirsim_graph::topology::erdos_renyi_mean_degree;
use sirsim_graph::ContactGraph;
use sirsim_simulation::{
    simulate_sar, simulate_sir, SarSimulator, SimulationError, SirSimulator, SpreadParams,
    SpreadResult,
};
use sirsim_test_helpers::{isolated_nodes, path_graph, star_graph};

fn random_graph(n: usize, mean_degree: f64, seed: u64) -> ContactGraph {
    erdos_renyi_mean_degree(n, mean_degree, &mut SimRng::seed_from_u64(seed)).unwrap()
}

/// Conservation, time order and single-step changes between samples.
fn assert_well_formed(result: &SpreadResult) {
    let n = result.node_count();
    let samples = result.samples();
    assert_eq!(samples[0].time, 0.0);
    assert_eq!(samples[0].counts.susceptible, n);

    for sample in samples {
        assert_eq!(sample.counts.total(), n, "population not conserved at {}", sample.time);
    }

    for pair in samples.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a.time <= b.time, "time went backwards: {} -> {}", a.time, b.time);

        let ds = b.counts.susceptible as i64 - a.counts.susceptible as i64;
        let di = b.counts.infectious as i64 - a.counts.infectious as i64;
        let dr = b.counts.recovered as i64 - a.counts.recovered as i64;
        let step = (ds, di, dr);
        assert!(
            step == (-1, 1, 0) || step == (0, -1, 1),
            "unexpected change {step:?} at t={}",
            b.time
        );
    }

    // Per-node timestamps agree with the aggregate counts.
    let final_counts = result.final_counts();
    let mut infected = 0;
    let mut recovered = 0;
    for (_, infected_at, recovered_at) in result.node_times() {
        if let Some(ti) = infected_at {
            infected += 1;
            if let Some(tr) = recovered_at {
                assert!(ti <= tr);
                recovered += 1;
            }
        } else {
            assert!(recovered_at.is_none());
        }
    }
    assert_eq!(infected, final_counts.ever_infected());
    assert_eq!(recovered, final_counts.recovered);
    assert_eq!(samples.len() as u64, result.stats().transitions + 1);
}

#[test]
fn test_sir_runs_are_well_formed() {
    let graph = random_graph(500, 6.0, 11);
    for seed in 0..5 {
        for alpha in [-1.0, 0.0, 1.0] {
            let params = SpreadParams::new(0.4, 1.0, 50.0).with_alpha(alpha);
            let result = simulate_sir(&graph, params, &[0, 1, 2], seed).unwrap();
            assert_well_formed(&result);
        }
    }
}

#[test]
fn test_sar_runs_are_well_formed() {
    let graph = random_graph(400, 10.0, 12);
    for seed in 0..5 {
        let params = SpreadParams::new(1.0, 0.5, 50.0);
        let result = simulate_sar(&graph, params, vec![2; 400], &[0, 1, 2, 3, 4], seed).unwrap();
        assert_well_formed(&result);
    }
}

#[test]
fn test_path_scenario() {
    let graph = path_graph(4);
    let params = SpreadParams::new(1.0, 1.0, 1_000.0);

    let mut full_outbreaks = 0;
    for seed in 0..200 {
        let result = simulate_sir(&graph, params, &[0], seed).unwrap();
        assert_well_formed(&result);
        assert_eq!(result.infected_at(0), Some(0.0));

        // Everything that was infected has recovered well before the horizon.
        let last = result.final_counts();
        assert_eq!(last.infectious, 0);
        assert_eq!(last.recovered, result.final_size());

        if last.recovered == 4 {
            full_outbreaks += 1;
            for u in 1..4 {
                assert!(result.infected_at(u) > result.infected_at(u - 1));
            }
        }
    }
    // Each hop succeeds with probability 1/2.
    assert!(full_outbreaks > 0);
}

#[test]
fn test_tiny_horizon_keeps_only_seed_infections() {
    let graph = random_graph(200, 8.0, 3);
    let params = SpreadParams::new(5.0, 5.0, f64::MIN_POSITIVE);
    let result = simulate_sir(&graph, params, &[4, 9, 4], 1).unwrap();

    assert_eq!(result.samples().len(), 3);
    let last = result.final_counts();
    assert_eq!(last.infectious, 2);
    assert_eq!(last.recovered, 0);
    assert_eq!(result.infected_at(4), Some(0.0));
    assert_eq!(result.infected_at(9), Some(0.0));
}

#[test]
fn test_zero_lambda_never_transmits() {
    let graph = random_graph(100, 5.0, 4);
    let params = SpreadParams::new(0.0, 1.0, 100.0);
    let result = simulate_sir(&graph, params, &[0], 2).unwrap();
    assert_eq!(result.final_size(), 1);
}

#[test]
fn test_underflowing_rate_never_transmits() {
    // 9^-2000 underflows to exactly zero.
    let graph = star_graph(10);
    let params = SpreadParams::new(1.0, 1.0, 100.0).with_alpha(-2000.0);
    let result = simulate_sir(&graph, params, &[0], 2).unwrap();
    assert_eq!(result.final_size(), 1);
    assert_eq!(result.final_counts().recovered, 1);
}

#[test]
fn test_zero_gamma_never_recovers() {
    let graph = random_graph(300, 6.0, 5);
    let hub = (0..300).max_by_key(|&u| graph.degree(u)).unwrap();
    let params = SpreadParams::new(1.0, 0.0, 30.0);
    let result = simulate_sir(&graph, params, &[hub], 8).unwrap();
    assert_eq!(result.final_counts().recovered, 0);
    assert!(result.final_size() > 1);
    assert!(result.node_times().all(|(_, _, r)| r.is_none()));
}

#[test]
fn test_isolated_seed_cannot_spread() {
    let graph = isolated_nodes(5);
    let result = simulate_sir(&graph, SpreadParams::default(), &[2], 1).unwrap();
    assert_eq!(result.final_size(), 1);
    assert_well_formed(&result);
}

#[test]
fn test_empty_initial_set_records_only_the_start() {
    let graph = path_graph(3);
    let result = simulate_sir(&graph, SpreadParams::default(), &[], 1).unwrap();
    assert_eq!(result.samples().len(), 1);
    assert_eq!(result.final_size(), 0);
}

#[test]
fn test_unit_thresholds_reproduce_sir() {
    let graph = random_graph(300, 6.0, 6);
    let params = SpreadParams::new(0.6, 1.0, 40.0).with_beta(0.5);

    let sir = simulate_sir(&graph, params, &[7], 21).unwrap();
    let sar = simulate_sar(&graph, params, vec![1; 300], &[7], 21).unwrap();
    assert_eq!(sir.samples(), sar.samples());
    assert!(sir.node_times().eq(sar.node_times()));
}

#[test]
fn test_zero_thresholds_reproduce_sir() {
    let graph = random_graph(300, 6.0, 8);
    let params = SpreadParams::new(0.8, 1.0, 40.0).with_alpha(0.5);

    let sir = simulate_sir(&graph, params, &[3, 11], 5).unwrap();
    let sar = simulate_sar(&graph, params, vec![0; 300], &[3, 11], 5).unwrap();
    assert_eq!(sir.samples(), sar.samples());
    assert!(sir.node_times().eq(sar.node_times()));
    assert_eq!(sar.stats().sub_threshold_exposures, 0);
}

#[test]
fn test_two_active_neighbours_activate_threshold_two_node() {
    // Both ends are active forever; the middle needs one exposure from each.
    let graph = path_graph(3);
    let params = SpreadParams::new(5.0, 0.0, 1000.0);
    for seed in 0..200 {
        let result = simulate_sar(&graph, params, vec![1, 2, 1], &[0, 2], seed).unwrap();
        assert_well_formed(&result);
        assert!(result.infected_at(1).is_some(), "middle never activated, seed {seed}");
        assert_eq!(result.final_size(), 3);
        assert_eq!(result.stats().sub_threshold_exposures, 1);
    }
}

#[test]
fn test_threshold_above_degree_blocks_activation() {
    // Leaves have degree 1 and can never collect two exposures.
    let graph = star_graph(8);
    let mut thresholds = vec![2; 8];
    thresholds[0] = 1;
    let params = SpreadParams::new(10.0, 0.1, 100.0);
    let result = simulate_sar(&graph, params, thresholds, &[0], 3).unwrap();
    assert_eq!(result.final_size(), 1);
}

#[test]
fn test_invalid_configurations_fail_fast() {
    let graph = path_graph(3);
    let ok = SpreadParams::default();

    let cases: Vec<Result<SirSimulator<'_>, SimulationError>> = vec![
        SirSimulator::new(&graph, ok.with_lambda(-1.0), &[0], 1),
        SirSimulator::new(&graph, ok.with_gamma(-1.0), &[0], 1),
        SirSimulator::new(&graph, ok.with_horizon(0.0), &[0], 1),
        SirSimulator::new(&graph, ok, &[0, 3], 1),
    ];
    for case in cases {
        assert!(matches!(case, Err(SimulationError::InvalidConfiguration(_))));
    }

    let err = SarSimulator::new(&graph, ok, vec![1, 1], &[0], 1).unwrap_err();
    assert!(matches!(err, SimulationError::InvalidConfiguration(_)));
}
