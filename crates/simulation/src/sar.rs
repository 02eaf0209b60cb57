//! Threshold (complex-contagion) SAR simulator.

use crate::propagation::{unique_initial, Activation, Propagation};
use crate::{SimulationError, SpreadParams, SpreadResult};
use sirsim_graph::ContactGraph;
use sirsim_types::NodeIndex;

/// Continuous-time SAR: a susceptible node becomes Active only after
/// `thresholds[u]` valid exposures.
///
/// Each exposure is scheduled with the same acceptance rule as SIR, and each
/// neighbour exposes a node at most once. A valid exposure below threshold
/// resets the node's prediction and redraws, from the exposure time, the
/// transmission of every other Active neighbour that has not exposed it yet.
/// Initial nodes are active at `t = 0` regardless of their threshold.
#[derive(Debug, Clone)]
pub struct SarSimulator<'g> {
    graph: &'g ContactGraph,
    params: SpreadParams,
    thresholds: Vec<u32>,
    initial: Vec<NodeIndex>,
    seed: u64,
}

impl<'g> SarSimulator<'g> {
    /// `thresholds` must hold exactly one entry per node. A threshold of 0
    /// behaves like 1.
    pub fn new(
        graph: &'g ContactGraph,
        params: SpreadParams,
        thresholds: Vec<u32>,
        initial: &[NodeIndex],
        seed: u64,
    ) -> Result<Self, SimulationError> {
        params.validate()?;
        if thresholds.len() != graph.node_count() {
            return Err(SimulationError::config(format!(
                "expected {} thresholds, got {}",
                graph.node_count(),
                thresholds.len()
            )));
        }
        let initial = unique_initial(graph.node_count(), initial)?;
        Ok(Self {
            graph,
            params,
            thresholds,
            initial,
            seed,
        })
    }

    /// Every node gets the same threshold.
    pub fn with_uniform_threshold(
        graph: &'g ContactGraph,
        params: SpreadParams,
        threshold: u32,
        initial: &[NodeIndex],
        seed: u64,
    ) -> Result<Self, SimulationError> {
        Self::new(
            graph,
            params,
            vec![threshold; graph.node_count()],
            initial,
            seed,
        )
    }

    /// The validated spreading parameters.
    pub fn params(&self) -> &SpreadParams {
        &self.params
    }

    /// Activation threshold per node.
    pub fn thresholds(&self) -> &[u32] {
        &self.thresholds
    }

    pub fn initial(&self) -> &[NodeIndex] {
        &self.initial
    }

    /// Run one realisation. Runs with the same seed are identical.
    pub fn run(&self) -> Result<SpreadResult, SimulationError> {
        let mut engine = Propagation::new(
            self.graph,
            self.params,
            Activation::Threshold(&self.thresholds),
            self.seed,
        );
        engine.seed(&self.initial);
        engine.run()
    }
}

/// Build a [`SarSimulator`] and run it once.
pub fn simulate_sar(
    graph: &ContactGraph,
    params: SpreadParams,
    thresholds: Vec<u32>,
    initial: &[NodeIndex],
    seed: u64,
) -> Result<SpreadResult, SimulationError> {
    SarSimulator::new(graph, params, thresholds, initial, seed)?.run()
}
