//! Discrete-time SIR with reactive vaccination.
//!
//! Every step, each infectious node exposes its susceptible neighbours. An
//! exposed node is first offered vaccination (probability `omega`, while the
//! cap allows) and otherwise infection (probability `beta`). With radius 2,
//! susceptible second neighbours are offered vaccination as well. All
//! changes decided in a step are applied together at its end.

use crate::propagation::unique_initial;
use crate::SimulationError;
use serde::{Deserialize, Serialize};
use sirsim_core::SimRng;
use sirsim_graph::ContactGraph;
use sirsim_types::{Compartment, CompartmentCounts, NodeIndex};
use tracing::{debug, trace};

/// Parameters of the vaccination model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VacSirConfig {
    /// Vaccination probability per exposure, in `[0, 1]`.
    pub omega: f64,
    /// Infection probability per exposure, in `[0, 1]`.
    pub beta: f64,
    /// Steps a node stays infectious before it is marked for recovery.
    pub gamma: u32,
    /// Number of steps to simulate.
    pub steps: u32,
    /// Vaccination cap as a fraction of the population, in `[0, 1]`.
    pub vac_max: f64,
    /// 1 = neighbours only, 2 = neighbours and second neighbours.
    pub radius: u8,
}

impl Default for VacSirConfig {
    fn default() -> Self {
        Self {
            omega: 0.45,
            beta: 0.168,
            gamma: 3,
            steps: 120,
            vac_max: 0.5,
            radius: 1,
        }
    }
}

impl VacSirConfig {
    pub fn with_omega(mut self, omega: f64) -> Self {
        self.omega = omega;
        self
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    pub fn with_gamma(mut self, gamma: u32) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_vac_max(mut self, vac_max: f64) -> Self {
        self.vac_max = vac_max;
        self
    }

    pub fn with_radius(mut self, radius: u8) -> Self {
        self.radius = radius;
        self
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        let unit = 0.0..=1.0;
        if !unit.contains(&self.omega) || !unit.contains(&self.beta) {
            return Err(SimulationError::config(format!(
                "omega and beta must be probabilities, got omega={} beta={}",
                self.omega, self.beta
            )));
        }
        if !unit.contains(&self.vac_max) {
            return Err(SimulationError::config(format!(
                "vac_max must be in [0, 1], got {}",
                self.vac_max
            )));
        }
        if self.steps == 0 {
            return Err(SimulationError::config("steps must be positive"));
        }
        if !matches!(self.radius, 1 | 2) {
            return Err(SimulationError::config(format!(
                "vaccination radius must be 1 or 2, got {}",
                self.radius
            )));
        }
        Ok(())
    }

    /// Maximum number of vaccinations on a population of `n`.
    pub fn vaccination_cap(&self, n: usize) -> usize {
        ((self.vac_max * n as f64).floor() as usize).min(n)
    }
}

/// Per-step compartment series, each of length `steps + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacSirResult {
    pub susceptible: Vec<usize>,
    pub infectious: Vec<usize>,
    pub vaccinated: Vec<usize>,
    pub recovered: Vec<usize>,
}

impl VacSirResult {
    fn with_steps(steps: usize) -> Self {
        Self {
            susceptible: vec![0; steps + 1],
            infectious: vec![0; steps + 1],
            vaccinated: vec![0; steps + 1],
            recovered: vec![0; steps + 1],
        }
    }

    fn set(&mut self, t: usize, counts: CompartmentCounts) {
        self.susceptible[t] = counts.susceptible;
        self.infectious[t] = counts.infectious;
        self.vaccinated[t] = counts.vaccinated;
        self.recovered[t] = counts.recovered;
    }

    /// Number of recorded steps, `steps + 1`.
    pub fn len(&self) -> usize {
        self.susceptible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.susceptible.is_empty()
    }

    /// Counts at step `t`.
    pub fn counts_at(&self, t: usize) -> Option<CompartmentCounts> {
        Some(CompartmentCounts {
            susceptible: *self.susceptible.get(t)?,
            infectious: self.infectious[t],
            recovered: self.recovered[t],
            vaccinated: self.vaccinated[t],
        })
    }

    pub fn final_counts(&self) -> CompartmentCounts {
        self.counts_at(self.len().saturating_sub(1))
            .unwrap_or_default()
    }

    /// `(step, infectious)` at the first step with the most infectious nodes.
    pub fn peak_infectious(&self) -> (usize, usize) {
        self.infectious
            .iter()
            .copied()
            .enumerate()
            .fold((0, 0), |best, (t, i)| if i > best.1 { (t, i) } else { best })
    }
}

/// Discrete-time vaccination simulator bound to one graph.
#[derive(Debug, Clone)]
pub struct VacSirSimulator<'g> {
    graph: &'g ContactGraph,
    config: VacSirConfig,
    initial: Vec<NodeIndex>,
    seed: u64,
}

/// Marks collected during one step, applied at its end.
struct StepMarks {
    infect: Vec<bool>,
    recover: Vec<bool>,
    vaccinate: Vec<bool>,
}

impl StepMarks {
    fn new(n: usize) -> Self {
        Self {
            infect: vec![false; n],
            recover: vec![false; n],
            vaccinate: vec![false; n],
        }
    }

    fn clear(&mut self) {
        self.infect.fill(false);
        self.recover.fill(false);
        self.vaccinate.fill(false);
    }

    fn is_marked(&self, v: usize) -> bool {
        self.infect[v] || self.vaccinate[v]
    }
}

impl<'g> VacSirSimulator<'g> {
    pub fn new(
        graph: &'g ContactGraph,
        config: VacSirConfig,
        initial: &[NodeIndex],
        seed: u64,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        let initial = unique_initial(graph.node_count(), initial)?;
        Ok(Self {
            graph,
            config,
            initial,
            seed,
        })
    }

    pub fn config(&self) -> &VacSirConfig {
        &self.config
    }

    pub fn run(&self) -> Result<VacSirResult, SimulationError> {
        let graph = self.graph;
        let config = &self.config;
        let n = graph.node_count();
        let steps = config.steps as usize;
        let cap = config.vaccination_cap(n);
        let mut rng = SimRng::seed_from_u64(self.seed);

        let mut status = vec![Compartment::Susceptible; n];
        let mut infected_for = vec![0u32; n];
        let mut counts = CompartmentCounts::all_susceptible(n);
        for &u in &self.initial {
            status[u as usize] = Compartment::Infectious;
            counts.susceptible -= 1;
            counts.infectious += 1;
        }

        let mut result = VacSirResult::with_steps(steps);
        result.set(0, counts);

        let mut vaccinations = 0usize;
        let mut marks = StepMarks::new(n);
        let mut second: Vec<NodeIndex> = Vec::new();

        debug!(
            nodes = n,
            seeds = self.initial.len(),
            steps,
            cap,
            radius = config.radius,
            "Starting vaccination run"
        );

        for t in 0..steps {
            marks.clear();

            for u in 0..n {
                if status[u] != Compartment::Infectious {
                    continue;
                }
                // Nodes due to recover still expose their neighbours this step.
                if infected_for[u] >= config.gamma {
                    marks.recover[u] = true;
                }

                let neighbors = graph.neighbors(u as NodeIndex);
                for &v in neighbors {
                    let vi = v as usize;
                    if status[vi] != Compartment::Susceptible || marks.is_marked(vi) {
                        continue;
                    }
                    if rng.next_f64() < config.omega && vaccinations < cap {
                        marks.vaccinate[vi] = true;
                        vaccinations += 1;
                    } else if rng.next_f64() < config.beta {
                        marks.infect[vi] = true;
                    }
                }

                if config.radius == 2 {
                    second.clear();
                    for &v in neighbors {
                        second.extend(graph.neighbors(v).iter().copied().filter(|&w| {
                            let wi = w as usize;
                            status[wi] == Compartment::Susceptible && !marks.is_marked(wi)
                        }));
                    }
                    for &w in &second {
                        let wi = w as usize;
                        // The same node can be reached through several neighbours.
                        if marks.is_marked(wi) {
                            continue;
                        }
                        if rng.next_f64() < config.omega && vaccinations < cap {
                            marks.vaccinate[wi] = true;
                            vaccinations += 1;
                        }
                    }
                }
            }

            let time = t as f64;
            use Compartment::{Infectious, Recovered, Susceptible, Vaccinated};
            apply(&mut status, &mut counts, &marks.infect, Susceptible, Infectious, time)?;
            apply(&mut status, &mut counts, &marks.recover, Infectious, Recovered, time)?;
            apply(&mut status, &mut counts, &marks.vaccinate, Susceptible, Vaccinated, time)?;

            for u in 0..n {
                if status[u] == Compartment::Infectious {
                    infected_for[u] += 1;
                }
            }

            result.set(t + 1, counts);
            trace!(step = t + 1, ?counts, "Step complete");

            if counts.infectious == 0 {
                for rest in t + 2..=steps {
                    result.set(rest, counts);
                }
                debug!(step = t + 1, "Epidemic died out");
                break;
            }
        }

        debug!(
            vaccinated = counts.vaccinated,
            recovered = counts.recovered,
            "Vaccination run complete"
        );
        Ok(result)
    }
}

/// Move every marked node from `from` to `to`, in index order.
fn apply(
    status: &mut [Compartment],
    counts: &mut CompartmentCounts,
    marked: &[bool],
    from: Compartment,
    to: Compartment,
    time: f64,
) -> Result<(), SimulationError> {
    for u in (0..marked.len()).filter(|&u| marked[u]) {
        let actual = status[u];
        let inconsistent = SimulationError::InconsistentState {
            node: u as NodeIndex,
            expected: from,
            actual,
            time,
        };
        if actual != from {
            return Err(inconsistent);
        }
        counts.transfer(from, to).ok_or(inconsistent)?;
        status[u] = to;
    }
    Ok(())
}

/// Build a [`VacSirSimulator`] and run it once.
pub fn simulate_vacsir(
    graph: &ContactGraph,
    config: VacSirConfig,
    initial: &[NodeIndex],
    seed: u64,
) -> Result<VacSirResult, SimulationError> {
    VacSirSimulator::new(graph, config, initial, seed)?.run()
}
