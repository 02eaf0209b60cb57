//! Continuous-time event-driven propagation shared by SIR and SAR.
//!
//! Each node carries one authoritative predicted infection time. A new
//! transmission candidate is only pushed when it beats that value (and the
//! source's recovery and the horizon), so every earlier push for the same
//! node becomes stale. Stale events stay in the queue and are dropped when
//! popped because their time no longer equals the authoritative one.
//!
//! Under a threshold rule every neighbour exposes a node at most once. A
//! valid exposure below threshold re-opens the node and redraws the clocks
//! of the active neighbours that have not exposed it yet; exponential clocks
//! are memoryless, so the fresh draws are exact.

use crate::{RunStats, SimulationError, SpreadParams, SpreadResult};
use sirsim_core::{EventQueue, SimRng};
use sirsim_graph::ContactGraph;
use sirsim_types::{Compartment, CompartmentCounts, EventKind, ModelKind, NodeIndex};
use tracing::{debug, trace};

/// How a susceptible node reacts to a valid transmission.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Activation<'a> {
    /// One transmission is enough.
    Simple,
    /// Node `u` activates on its `thresholds[u]`-th exposure.
    Threshold(&'a [u32]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Ready,
    Running,
    Done,
}

/// Validate and de-duplicate initial nodes, keeping first-seen order.
pub(crate) fn unique_initial(
    node_count: usize,
    initial: &[NodeIndex],
) -> Result<Vec<NodeIndex>, SimulationError> {
    let mut seen = vec![false; node_count];
    let mut unique = Vec::with_capacity(initial.len());
    for &u in initial {
        let slot = seen.get_mut(u as usize).ok_or_else(|| {
            SimulationError::config(format!(
                "initial node {u} is out of range for {node_count} nodes"
            ))
        })?;
        if !*slot {
            *slot = true;
            unique.push(u);
        }
    }
    Ok(unique)
}

/// Run-scoped state. Created per run, consumed by [`Propagation::run`].
pub(crate) struct Propagation<'a> {
    graph: &'a ContactGraph,
    params: SpreadParams,
    activation: Activation<'a>,
    phase: Phase,

    status: Vec<Compartment>,
    predicted: Vec<f64>,
    recovery: Vec<f64>,
    exposures: Vec<u32>,
    /// Arc from each node back to the source of its current prediction.
    pending_arc: Vec<Option<usize>>,
    /// Per arc `v → w`: `w` has already exposed `v`. Empty for SIR.
    exposed: Vec<bool>,
    counts: CompartmentCounts,

    queue: EventQueue,
    rng: SimRng,
    result: SpreadResult,
    stats: RunStats,
}

impl<'a> Propagation<'a> {
    pub(crate) fn new(
        graph: &'a ContactGraph,
        params: SpreadParams,
        activation: Activation<'a>,
        seed: u64,
    ) -> Self {
        let n = graph.node_count();
        let model = match activation {
            Activation::Simple => ModelKind::Sir,
            Activation::Threshold(_) => ModelKind::Sar,
        };
        let exposed = match activation {
            Activation::Simple => Vec::new(),
            Activation::Threshold(_) => vec![false; graph.arc_count()],
        };
        let counts = CompartmentCounts::all_susceptible(n);
        let mut result = SpreadResult::new(model, n);
        result.record(0.0, counts);

        Self {
            graph,
            params,
            activation,
            phase: Phase::Ready,
            status: vec![Compartment::Susceptible; n],
            predicted: vec![f64::INFINITY; n],
            recovery: vec![f64::INFINITY; n],
            exposures: vec![0; n],
            pending_arc: vec![None; n],
            exposed,
            counts,
            queue: EventQueue::with_capacity(n),
            rng: SimRng::seed_from_u64(seed),
            result,
            stats: RunStats::default(),
        }
    }

    /// Schedule a transmission at `t = 0` for every seed.
    ///
    /// Seeds must already be unique and in range. Under a threshold rule a
    /// seed starts one exposure short of its threshold, so the seed event
    /// itself activates it.
    pub(crate) fn seed(&mut self, initial: &[NodeIndex]) {
        debug_assert_eq!(self.phase, Phase::Ready);
        for &u in initial {
            let i = u as usize;
            if let Activation::Threshold(thresholds) = self.activation {
                self.exposures[i] = thresholds[i].saturating_sub(1);
            }
            self.predicted[i] = 0.0;
            self.pending_arc[i] = None;
            self.queue.schedule(0.0, u, EventKind::Transmit);
        }
    }

    /// Process events until the queue drains or the horizon is reached.
    pub(crate) fn run(mut self) -> Result<SpreadResult, SimulationError> {
        debug!(
            model = %self.result.model(),
            nodes = self.graph.node_count(),
            seeds = self.queue.len(),
            lambda = self.params.lambda,
            gamma = self.params.gamma,
            horizon = self.params.horizon,
            "Starting propagation run"
        );
        while self.step()? {}
        Ok(self.finish())
    }

    /// Handle the next event. Returns `false` once the run is over.
    pub(crate) fn step(&mut self) -> Result<bool, SimulationError> {
        if self.phase == Phase::Done {
            return Ok(false);
        }
        self.phase = Phase::Running;

        if self.queue.is_empty() {
            self.phase = Phase::Done;
            return Ok(false);
        }
        let event = self.queue.pop_min()?;

        // Every remaining event is at least as late, so none can fire.
        if event.time >= self.params.horizon {
            self.stats.discarded_at_horizon = self.queue.len() as u64 + 1;
            self.phase = Phase::Done;
            return Ok(false);
        }

        self.stats.events_processed += 1;
        match event.kind {
            EventKind::Transmit => self.on_transmit(event.node, event.time)?,
            EventKind::Recover => self.on_recover(event.node, event.time)?,
        }
        Ok(true)
    }

    fn finish(mut self) -> SpreadResult {
        self.phase = Phase::Done;
        debug!(
            samples = self.result.samples().len(),
            events = self.stats.events_processed,
            stale = self.stats.stale_events,
            discarded = self.stats.discarded_at_horizon,
            final_size = self.counts.ever_infected(),
            "Propagation run complete"
        );
        self.result.set_stats(self.stats);
        self.result
    }

    fn on_transmit(&mut self, u: NodeIndex, t: f64) -> Result<(), SimulationError> {
        let i = u as usize;
        // Exact comparison: the event must be the one that set `predicted`.
        #[allow(clippy::float_cmp)]
        let current = self.status[i] == Compartment::Susceptible && t == self.predicted[i];
        if !current {
            self.stats.stale_events += 1;
            trace!(node = u, time = t, "Dropped stale transmission");
            return Ok(());
        }

        if let Activation::Threshold(thresholds) = self.activation {
            self.exposures[i] = self.exposures[i].saturating_add(1);
            if self.exposures[i] < thresholds[i] {
                self.stats.sub_threshold_exposures += 1;
                trace!(
                    node = u,
                    time = t,
                    exposures = self.exposures[i],
                    threshold = thresholds[i],
                    "Exposure below threshold"
                );
                self.reopen(u, t);
                return Ok(());
            }
        }

        self.activate(u, t)
    }

    fn activate(&mut self, u: NodeIndex, t: f64) -> Result<(), SimulationError> {
        self.transition(u, Compartment::Susceptible, Compartment::Infectious, t)?;
        self.result.mark_infected(u, t);

        // Recovery is drawn before any neighbour, fixing the draw order.
        let recovery_at = t + self.rng.exponential(self.params.gamma);
        self.recovery[u as usize] = recovery_at;
        if recovery_at < self.params.horizon {
            self.queue.schedule(recovery_at, u, EventKind::Recover);
        }

        for arc in self.graph.arcs(u) {
            self.find_transmit(arc, t);
        }
        Ok(())
    }

    /// After a sub-threshold exposure at `t`: retire the exposing arc and
    /// redraw every other active neighbour that has not exposed `u` yet.
    fn reopen(&mut self, u: NodeIndex, t: f64) {
        let i = u as usize;
        if let Some(arc) = self.pending_arc[i].take() {
            self.exposed[arc] = true;
        }
        self.predicted[i] = f64::INFINITY;

        let graph = self.graph;
        for back in graph.arcs(u) {
            let w = graph.head(back);
            if self.exposed[back] || self.status[w as usize] != Compartment::Infectious {
                continue;
            }
            self.find_transmit(graph.reverse(back), t);
        }
    }

    fn on_recover(&mut self, u: NodeIndex, t: f64) -> Result<(), SimulationError> {
        let i = u as usize;
        #[allow(clippy::float_cmp)]
        let current = self.status[i] == Compartment::Infectious && t == self.recovery[i];
        if !current {
            self.stats.stale_events += 1;
            return Ok(());
        }
        self.transition(u, Compartment::Infectious, Compartment::Recovered, t)?;
        self.result.mark_recovered(u, t);
        Ok(())
    }

    /// Draw a transmission time along `arc` and keep it if it beats the
    /// target's current prediction.
    fn find_transmit(&mut self, arc: usize, t: f64) {
        let source = self.graph.source(arc);
        let target = self.graph.head(arc);
        let j = target as usize;
        if self.status[j] != Compartment::Susceptible {
            return;
        }

        let rate = self
            .params
            .effective_rate(self.graph.degree(source), self.graph.degree(target));
        if rate == 0.0 {
            return;
        }

        let candidate = t + self.rng.exponential(rate);
        let bound = self.recovery[source as usize]
            .min(self.predicted[j])
            .min(self.params.horizon);
        if candidate < bound {
            self.predicted[j] = candidate;
            self.pending_arc[j] = Some(self.graph.reverse(arc));
            self.queue.schedule(candidate, target, EventKind::Transmit);
        }
    }

    /// Move `u` from `from` to `to`, update the counts and record a sample.
    fn transition(
        &mut self,
        u: NodeIndex,
        from: Compartment,
        to: Compartment,
        t: f64,
    ) -> Result<(), SimulationError> {
        let i = u as usize;
        let actual = self.status[i];
        let inconsistent = SimulationError::InconsistentState {
            node: u,
            expected: from,
            actual,
            time: t,
        };
        if actual != from {
            return Err(inconsistent);
        }
        self.counts.transfer(from, to).ok_or(inconsistent)?;
        self.status[i] = to;
        self.result.record(t, self.counts);
        self.stats.transitions += 1;

        trace!(node = u, time = t, %from, %to, "Transition");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sirsim_test_helpers::{path_graph, star_graph};
    use tracing_test::traced_test;

    /// Propose a transmission time for `node` through the normal acceptance
    /// rule, as if a neighbour with infinite recovery time had drawn it.
    fn propose(engine: &mut Propagation<'_>, node: NodeIndex, time: f64) -> bool {
        let i = node as usize;
        if time < engine.predicted[i].min(engine.params.horizon) {
            engine.predicted[i] = time;
            engine.queue.schedule(time, node, EventKind::Transmit);
            true
        } else {
            false
        }
    }

    fn quiet_params() -> SpreadParams {
        // No onward transmission, no recovery.
        SpreadParams::new(0.0, 0.0, 10.0)
    }

    #[test]
    fn test_unique_initial_dedups_and_checks_range() {
        assert_eq!(unique_initial(5, &[3, 1, 3, 1, 0]).unwrap(), vec![3, 1, 0]);
        let err = unique_initial(2, &[0, 2]).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_only_authoritative_prediction_fires() {
        let graph = path_graph(2);
        let mut engine = Propagation::new(&graph, quiet_params(), Activation::Simple, 1);

        assert!(propose(&mut engine, 1, 3.0));
        // A later candidate never replaces an earlier one.
        assert!(!propose(&mut engine, 1, 4.0));
        // A raw push that never became authoritative.
        engine.queue.schedule(1.0, 1, EventKind::Transmit);

        assert!(engine.step().unwrap());
        assert_eq!(engine.status[1], Compartment::Susceptible);
        assert_eq!(engine.stats.stale_events, 1);

        assert!(engine.step().unwrap());
        assert_eq!(engine.status[1], Compartment::Infectious);

        let result = engine.run().unwrap();
        assert_eq!(result.infected_at(1), Some(3.0));
        assert_eq!(result.samples().len(), 2);
    }

    #[test]
    fn test_earlier_prediction_supersedes_pending_one() {
        let graph = path_graph(2);
        let mut engine = Propagation::new(&graph, quiet_params(), Activation::Simple, 1);

        assert!(propose(&mut engine, 1, 2.0));
        assert!(propose(&mut engine, 1, 1.0));

        let result = engine.run().unwrap();
        assert_eq!(result.infected_at(1), Some(1.0));
        assert_eq!(result.stats().stale_events, 1);
        assert_eq!(result.stats().transitions, 1);
    }

    #[test]
    fn test_threshold_needs_second_exposure() {
        let graph = star_graph(3);
        let thresholds = [1, 2, 1];
        let mut engine =
            Propagation::new(&graph, quiet_params(), Activation::Threshold(&thresholds), 5);

        assert!(propose(&mut engine, 1, 0.5));
        assert!(engine.step().unwrap());
        assert_eq!(engine.status[1], Compartment::Susceptible);
        assert_eq!(engine.exposures[1], 1);
        // The node is open to the next exposure again.
        assert_eq!(engine.predicted[1], f64::INFINITY);

        assert!(propose(&mut engine, 1, 2.5));
        assert!(engine.step().unwrap());
        assert_eq!(engine.status[1], Compartment::Infectious);

        let result = engine.run().unwrap();
        assert_eq!(result.infected_at(1), Some(2.5));
        assert_eq!(result.stats().sub_threshold_exposures, 1);
    }

    #[test]
    fn test_each_neighbour_exposes_at_most_once() {
        let graph = path_graph(3);
        let thresholds = [1, 3, 1];
        let params = SpreadParams::new(5.0, 0.0, 1000.0);
        for seed in 0..20 {
            let mut engine =
                Propagation::new(&graph, params, Activation::Threshold(&thresholds), seed);
            engine.seed(&[0, 2]);
            let result = engine.run().unwrap();

            // Two active neighbours can never reach a threshold of three.
            assert_eq!(result.infected_at(1), None);
            assert_eq!(result.final_size(), 2);
            assert_eq!(result.stats().sub_threshold_exposures, 2);
        }
    }

    #[test]
    fn test_sub_threshold_exposure_redraws_other_neighbours() {
        let graph = path_graph(3);
        let thresholds = [1, 2, 1];
        let params = SpreadParams::new(5.0, 0.0, 1000.0);
        let mut engine = Propagation::new(&graph, params, Activation::Threshold(&thresholds), 3);
        engine.seed(&[0, 2]);
        while engine.exposures[1] == 0 {
            assert!(engine.step().unwrap());
        }

        // One end has exposed the middle; the other end holds a fresh draw.
        assert_eq!(engine.status[1], Compartment::Susceptible);
        assert!(engine.predicted[1].is_finite());
        let pending = engine.pending_arc[1].unwrap();
        assert_eq!(engine.exposed.iter().filter(|&&e| e).count(), 1);
        assert!(!engine.exposed[pending]);

        let result = engine.run().unwrap();
        assert!(result.infected_at(1).is_some());
        assert_eq!(result.final_size(), 3);
    }

    #[test]
    fn test_seed_activates_despite_threshold() {
        let graph = path_graph(3);
        let thresholds = [3, 3, 3];
        let mut engine =
            Propagation::new(&graph, quiet_params(), Activation::Threshold(&thresholds), 5);
        engine.seed(&[1]);
        let result = engine.run().unwrap();
        assert_eq!(result.infected_at(1), Some(0.0));
        assert_eq!(result.final_size(), 1);
    }

    #[test]
    fn test_recover_of_wrong_node_is_stale() {
        let graph = path_graph(2);
        let mut engine = Propagation::new(&graph, quiet_params(), Activation::Simple, 1);
        engine.queue.schedule(1.0, 0, EventKind::Recover);
        assert!(engine.step().unwrap());
        assert_eq!(engine.stats.stale_events, 1);
        assert_eq!(engine.counts, CompartmentCounts::all_susceptible(2));
    }

    #[test]
    fn test_transition_checks_prior_compartment() {
        let graph = path_graph(2);
        let mut engine = Propagation::new(&graph, quiet_params(), Activation::Simple, 1);
        let err = engine
            .transition(0, Compartment::Infectious, Compartment::Recovered, 4.0)
            .unwrap_err();
        assert_eq!(
            err,
            SimulationError::InconsistentState {
                node: 0,
                expected: Compartment::Infectious,
                actual: Compartment::Susceptible,
                time: 4.0,
            }
        );
    }

    #[test]
    fn test_events_at_horizon_are_discarded() {
        let graph = path_graph(2);
        let params = SpreadParams::new(0.0, 0.0, 1.0);
        let mut engine = Propagation::new(&graph, params, Activation::Simple, 1);
        engine.queue.schedule(1.0, 1, EventKind::Transmit);
        engine.queue.schedule(2.0, 0, EventKind::Transmit);

        assert!(!engine.step().unwrap());
        // Once done, stepping is a no-op.
        assert!(!engine.step().unwrap());
        let result = engine.run().unwrap();
        assert_eq!(result.stats().discarded_at_horizon, 2);
        assert_eq!(result.samples().len(), 1);
    }

    #[traced_test]
    #[test]
    fn test_run_reports_summary() {
        let graph = path_graph(5);
        let mut engine = Propagation::new(&graph, SpreadParams::default(), Activation::Simple, 9);
        engine.seed(&[2]);
        let result = engine.run().unwrap();
        assert!(result.final_size() >= 1);
        assert!(logs_contain("Propagation run complete"));
    }
}
