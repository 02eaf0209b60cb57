//! Configuration types for sweeps.

use crate::grid::{arange, linspace};
use crate::SimulatorError;
use sirsim_core::SimRng;
use sirsim_graph::topology::{erdos_renyi, erdos_renyi_mean_degree, power_law_configuration};
use sirsim_graph::{ContactGraph, GraphError};
use sirsim_simulation::VacSirConfig;
use std::path::PathBuf;

/// How a contact graph is obtained.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphKind {
    /// `G(n, p)`.
    ErdosRenyi { p: f64 },
    /// Fixed-edge Erdős–Rényi graph with the given mean degree.
    MeanDegree { mean_degree: f64 },
    /// Simple configuration model with `p(k) ∝ k^-exponent`.
    PowerLaw { exponent: f64 },
    /// Read from an edge-list file. The seed is ignored.
    EdgeList { path: PathBuf },
}

/// A graph recipe: node count plus generator.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphSpec {
    /// Number of nodes. For edge lists, 0 means "infer from the file".
    pub nodes: usize,
    pub kind: GraphKind,
}

impl GraphSpec {
    pub fn erdos_renyi(nodes: usize, p: f64) -> Self {
        Self {
            nodes,
            kind: GraphKind::ErdosRenyi { p },
        }
    }

    pub fn mean_degree(nodes: usize, mean_degree: f64) -> Self {
        Self {
            nodes,
            kind: GraphKind::MeanDegree { mean_degree },
        }
    }

    pub fn power_law(nodes: usize, exponent: f64) -> Self {
        Self {
            nodes,
            kind: GraphKind::PowerLaw { exponent },
        }
    }

    pub fn edge_list(path: impl Into<PathBuf>) -> Self {
        Self {
            nodes: 0,
            kind: GraphKind::EdgeList { path: path.into() },
        }
    }

    /// Build one realisation. Generated graphs are a pure function of `seed`.
    pub fn build(&self, seed: u64) -> Result<ContactGraph, GraphError> {
        let mut rng = SimRng::seed_from_u64(seed);
        match &self.kind {
            GraphKind::ErdosRenyi { p } => erdos_renyi(self.nodes, *p, &mut rng),
            GraphKind::MeanDegree { mean_degree } => {
                erdos_renyi_mean_degree(self.nodes, *mean_degree, &mut rng)
            }
            GraphKind::PowerLaw { exponent } => {
                power_law_configuration(self.nodes, *exponent, &mut rng)
            }
            GraphKind::EdgeList { path } => {
                let nodes = (self.nodes > 0).then_some(self.nodes);
                ContactGraph::load_edgelist(path, nodes)
            }
        }
    }

    /// Short label used in output directory names.
    pub fn label(&self) -> String {
        match &self.kind {
            GraphKind::EdgeList { path } => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "edgelist".to_string()),
            _ => self.nodes.to_string(),
        }
    }
}

impl Default for GraphSpec {
    fn default() -> Self {
        Self::mean_degree(100_000, 25.0)
    }
}

/// Activation rule of a spreading sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contagion {
    /// SIR: one valid contact infects.
    Simple,
    /// SAR: every node needs this many exposures.
    Threshold(u32),
}

/// What each run contributes to the batch file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// One row per recorded state change.
    TimeSeries,
    /// One row per run with the final counts.
    #[default]
    FinalState,
}

/// Sweep of SIR or SAR runs over graph realisations, degree exponents and
/// transmission rates.
///
/// Batch `b` uses graph seed `graph_seed + b`. Run `(b, itr, alpha, lambda)`
/// draws its initial nodes from stream `b * iterations + itr` of `init_seed`
/// and simulates with seed `sim_seed + b * iterations + itr`, so all
/// `(alpha, lambda)` points of one iteration share initial conditions.
#[derive(Clone, Debug)]
pub struct SpreadSweepConfig {
    pub graph: GraphSpec,
    pub contagion: Contagion,
    /// Independent graph realisations, processed in parallel.
    pub batches: usize,
    /// Repetitions per batch and parameter point.
    pub iterations: usize,
    /// Number of distinct initial nodes.
    pub initial_infected: usize,
    pub gamma: f64,
    pub horizon: f64,
    /// Target-degree exponent, fixed over the sweep.
    pub beta: f64,
    pub alphas: Vec<f64>,
    pub lambdas: Vec<f64>,
    pub graph_seed: u64,
    pub init_seed: u64,
    pub sim_seed: u64,
    pub output: OutputMode,
    /// Batch files and the summary are written here.
    pub output_dir: PathBuf,
}

impl SpreadSweepConfig {
    /// SIR sweep with default grids.
    pub fn sir() -> Self {
        Self {
            graph: GraphSpec::default(),
            contagion: Contagion::Simple,
            batches: 12,
            iterations: 10,
            initial_infected: 1,
            gamma: 1.0,
            horizon: 200.0,
            beta: 0.0,
            alphas: vec![-2.0, -1.0, 0.0, 1.0],
            lambdas: arange(0.0, 1.5, 0.01),
            graph_seed: 42,
            init_seed: 7,
            sim_seed: 12345,
            output: OutputMode::FinalState,
            output_dir: PathBuf::from("out/fastsir"),
        }
    }

    /// SAR sweep with a uniform activation threshold.
    pub fn sar(threshold: u32) -> Self {
        Self {
            contagion: Contagion::Threshold(threshold),
            output_dir: PathBuf::from("out/fastsar"),
            ..Self::sir()
        }
    }

    pub fn with_graph(mut self, graph: GraphSpec) -> Self {
        self.graph = graph;
        self
    }

    pub fn with_batches(mut self, batches: usize) -> Self {
        self.batches = batches;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_initial_infected(mut self, k0: usize) -> Self {
        self.initial_infected = k0;
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_horizon(mut self, horizon: f64) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    pub fn with_alphas(mut self, alphas: Vec<f64>) -> Self {
        self.alphas = alphas;
        self
    }

    pub fn with_lambdas(mut self, lambdas: Vec<f64>) -> Self {
        self.lambdas = lambdas;
        self
    }

    /// Set graph, initial-condition and simulation base seeds.
    pub fn with_seeds(mut self, graph_seed: u64, init_seed: u64, sim_seed: u64) -> Self {
        self.graph_seed = graph_seed;
        self.init_seed = init_seed;
        self.sim_seed = sim_seed;
        self
    }

    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Runs per batch.
    pub fn runs_per_batch(&self) -> usize {
        self.iterations * self.alphas.len() * self.lambdas.len()
    }

    /// Runs over the whole sweep.
    pub fn total_runs(&self) -> usize {
        self.batches * self.runs_per_batch()
    }

    /// Check everything that can be checked before building a graph. Rate
    /// and horizon ranges are checked again by the simulators themselves.
    pub fn validate(&self) -> Result<(), SimulatorError> {
        if self.batches == 0 || self.iterations == 0 {
            return Err(SimulatorError::sweep("batches and iterations must be positive"));
        }
        if self.alphas.is_empty() || self.lambdas.is_empty() {
            return Err(SimulatorError::sweep("alpha and lambda grids must not be empty"));
        }
        if self.lambdas.iter().any(|&l| !(l >= 0.0 && l.is_finite())) {
            return Err(SimulatorError::sweep("lambda values must be non-negative"));
        }
        if self.graph.nodes > 0 && self.initial_infected > self.graph.nodes {
            return Err(SimulatorError::sweep(format!(
                "cannot seed {} nodes in a graph of {}",
                self.initial_infected, self.graph.nodes
            )));
        }
        Ok(())
    }
}

impl Default for SpreadSweepConfig {
    fn default() -> Self {
        Self::sir()
    }
}

/// Repeated vaccination runs on one graph.
#[derive(Clone, Debug)]
pub struct VacSweepConfig {
    pub graph: GraphSpec,
    pub model: VacSirConfig,
    pub iterations: usize,
    pub initial_infected: usize,
    pub graph_seed: u64,
    /// Iteration `i` draws its initial nodes from stream `i` of this seed.
    pub init_seed: u64,
    /// Iteration `i` simulates with `sim_seed + i`.
    pub sim_seed: u64,
    pub output_dir: PathBuf,
}

impl Default for VacSweepConfig {
    fn default() -> Self {
        Self {
            graph: GraphSpec::mean_degree(10_000, 10.0),
            model: VacSirConfig::default(),
            iterations: 40,
            initial_infected: 1,
            graph_seed: 42,
            init_seed: 7,
            sim_seed: 12345,
            output_dir: PathBuf::from("out/vacsir"),
        }
    }
}

impl VacSweepConfig {
    pub fn with_graph(mut self, graph: GraphSpec) -> Self {
        self.graph = graph;
        self
    }

    pub fn with_model(mut self, model: VacSirConfig) -> Self {
        self.model = model;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_initial_infected(mut self, k0: usize) -> Self {
        self.initial_infected = k0;
        self
    }

    pub fn with_seeds(mut self, graph_seed: u64, init_seed: u64, sim_seed: u64) -> Self {
        self.graph_seed = graph_seed;
        self.init_seed = init_seed;
        self.sim_seed = sim_seed;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn validate(&self) -> Result<(), SimulatorError> {
        if self.iterations == 0 {
            return Err(SimulatorError::sweep("iterations must be positive"));
        }
        self.model.validate()?;
        Ok(())
    }
}

/// Site percolation followed by k-core pruning on fresh `G(n, z/(n-1))`
/// graphs.
#[derive(Clone, Debug)]
pub struct PercolationSweepConfig {
    pub nodes: usize,
    /// Expected mean degree of each generated graph.
    pub mean_degree: f64,
    pub k: usize,
    pub p_min: f64,
    pub p_max: f64,
    /// Number of occupancy values, both ends included.
    pub steps: usize,
    /// Graph realisations per occupancy value.
    pub trials: usize,
    pub seed: u64,
    pub output: PathBuf,
}

impl Default for PercolationSweepConfig {
    fn default() -> Self {
        Self {
            nodes: 10_000,
            mean_degree: 10.0,
            k: 3,
            p_min: 0.0,
            p_max: 1.0,
            steps: 51,
            trials: 20,
            seed: 42,
            output: PathBuf::from("out/kcore/percolation.csv"),
        }
    }
}

impl PercolationSweepConfig {
    pub fn with_nodes(mut self, nodes: usize) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn with_mean_degree(mut self, z: f64) -> Self {
        self.mean_degree = z;
        self
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Sweep `steps` occupancy values over `[p_min, p_max]`.
    pub fn with_range(mut self, p_min: f64, p_max: f64, steps: usize) -> Self {
        self.p_min = p_min;
        self.p_max = p_max;
        self.steps = steps;
        self
    }

    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Occupancy values of the sweep.
    pub fn occupancies(&self) -> Vec<f64> {
        linspace(self.p_min, self.p_max, self.steps)
    }

    /// Edge probability giving the configured mean degree, clamped to `[0, 1]`.
    pub fn edge_probability(&self) -> f64 {
        (self.mean_degree / self.nodes.saturating_sub(1).max(1) as f64).clamp(0.0, 1.0)
    }

    pub fn validate(&self) -> Result<(), SimulatorError> {
        if self.nodes == 0 || self.steps == 0 || self.trials == 0 {
            return Err(SimulatorError::sweep("nodes, steps and trials must be positive"));
        }
        let unit = 0.0..=1.0;
        if !unit.contains(&self.p_min) || !unit.contains(&self.p_max) || self.p_min > self.p_max {
            return Err(SimulatorError::sweep(format!(
                "occupancy range [{}, {}] must lie within [0, 1]",
                self.p_min, self.p_max
            )));
        }
        if !(self.mean_degree >= 0.0 && self.mean_degree.is_finite()) {
            return Err(SimulatorError::sweep("mean degree must be non-negative"));
        }
        Ok(())
    }
}
