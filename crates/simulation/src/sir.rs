//! Simple-contagion SIR simulator.

use crate::propagation::{unique_initial, Activation, Propagation};
use crate::{SimulationError, SpreadParams, SpreadResult};
use sirsim_graph::ContactGraph;
use sirsim_types::NodeIndex;

/// Continuous-time SIR on a shared contact graph.
///
/// Construction validates everything up front; [`SirSimulator::run`] then
/// builds fresh per-run state, so repeated runs with the same seed produce
/// identical results and many simulators can share one graph across threads.
#[derive(Debug, Clone)]
pub struct SirSimulator<'g> {
    graph: &'g ContactGraph,
    params: SpreadParams,
    initial: Vec<NodeIndex>,
    seed: u64,
}

impl<'g> SirSimulator<'g> {
    /// Duplicate initial nodes are collapsed; out-of-range ones are an error.
    pub fn new(
        graph: &'g ContactGraph,
        params: SpreadParams,
        initial: &[NodeIndex],
        seed: u64,
    ) -> Result<Self, SimulationError> {
        params.validate()?;
        let initial = unique_initial(graph.node_count(), initial)?;
        Ok(Self {
            graph,
            params,
            initial,
            seed,
        })
    }

    /// The validated spreading parameters.
    pub fn params(&self) -> &SpreadParams {
        &self.params
    }

    /// The de-duplicated initial infecteds, in first-seen order.
    pub fn initial(&self) -> &[NodeIndex] {
        &self.initial
    }

    /// Run one realisation. Runs with the same seed are identical.
    pub fn run(&self) -> Result<SpreadResult, SimulationError> {
        let mut engine = Propagation::new(self.graph, self.params, Activation::Simple, self.seed);
        engine.seed(&self.initial);
        engine.run()
    }
}

/// Build a [`SirSimulator`] and run it once.
pub fn simulate_sir(
    graph: &ContactGraph,
    params: SpreadParams,
    initial: &[NodeIndex],
    seed: u64,
) -> Result<SpreadResult, SimulationError> {
    SirSimulator::new(graph, params, initial, seed)?.run()
}
