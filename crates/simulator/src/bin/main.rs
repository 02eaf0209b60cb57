//! sirsim CLI
//!
//! Run epidemic spreading sweeps and single runs from the command line.
//!
//! # Example
//!
//! ```bash
//! # SIR sweep over the default lambda grid on 4 graph realisations
//! sirsim sir -n 10000 -z 10 --batches 4
//!
//! # SAR sweep with threshold 2, full time series
//! sirsim sar --threshold 2 --time-series --lambda-max 0.5
//!
//! # k-core percolation curve
//! sirsim kcore -n 10000 -z 10 -k 3 --trials 20
//!
//! # One run with a random seed, exporting its time series
//! sirsim run -n 1000 -z 8 --lambda 0.3
//! ```

use clap::{Args, Parser, Subcommand};
use sirsim_core::SimRng;
use sirsim_simulation::{simulate_sar, simulate_sir, SpreadParams, VacSirConfig};
use sirsim_simulator::{
    arange, resolve_indexed, run_percolation_sweep, run_spread_sweep, run_vacsir_sweep,
    save_node_times, save_time_series, GraphSpec, OutputMode, PercolationSweepConfig,
    SimulatorError, SpreadSweepConfig, VacSweepConfig,
};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// sirsim
///
/// Stochastic SIR, SAR and vaccination simulations on contact graphs.
/// Reproducible when the same seeds are used.
#[derive(Parser, Debug)]
#[command(name = "sirsim")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Worker threads for parallel sweeps. Defaults to one per core.
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sweep SIR runs over alpha and lambda
    Sir(SpreadArgs),
    /// Sweep SAR runs over alpha and lambda
    Sar {
        /// Exposures needed to activate a node
        #[arg(long, default_value = "2")]
        threshold: u32,
        #[command(flatten)]
        spread: SpreadArgs,
    },
    /// Repeat discrete-time vaccination runs on one graph
    Vacsir(VacArgs),
    /// Sweep site percolation followed by k-core pruning
    Kcore(KcoreArgs),
    /// Generate a graph and write its edge list
    Graph {
        #[command(flatten)]
        graph: GraphArgs,
        /// Generator seed. When omitted, a random seed is used.
        #[arg(long)]
        seed: Option<u64>,
        /// Output edge-list path
        #[arg(short = 'o', long, default_value = "out/graph.edgelist")]
        output: PathBuf,
    },
    /// Run SIR (or SAR with --threshold) once and export the result
    Run(RunArgs),
}

/// Graph source shared by the subcommands.
#[derive(Args, Debug, Clone)]
struct GraphArgs {
    /// Number of nodes
    #[arg(short = 'n', long)]
    nodes: Option<usize>,

    /// Mean degree of an Erdős–Rényi graph with a fixed edge count
    #[arg(short = 'z', long)]
    mean_degree: Option<f64>,

    /// Edge probability of a G(n, p) graph
    #[arg(long, conflicts_with_all = ["mean_degree", "power_law"])]
    edge_probability: Option<f64>,

    /// Degree exponent of a power-law configuration-model graph
    #[arg(long, conflicts_with = "mean_degree")]
    power_law: Option<f64>,

    /// Read the graph from an edge-list file instead of generating one
    #[arg(long, conflicts_with_all = ["mean_degree", "edge_probability", "power_law"])]
    edgelist: Option<PathBuf>,
}

impl GraphArgs {
    fn spec(&self, default: GraphSpec) -> GraphSpec {
        if let Some(path) = &self.edgelist {
            let mut spec = GraphSpec::edge_list(path);
            spec.nodes = self.nodes.unwrap_or(0);
            return spec;
        }
        let nodes = self.nodes.unwrap_or(default.nodes);
        if let Some(p) = self.edge_probability {
            GraphSpec::erdos_renyi(nodes, p)
        } else if let Some(exponent) = self.power_law {
            GraphSpec::power_law(nodes, exponent)
        } else if let Some(z) = self.mean_degree {
            GraphSpec::mean_degree(nodes, z)
        } else {
            GraphSpec { nodes, ..default }
        }
    }
}

#[derive(Args, Debug)]
struct SpreadArgs {
    #[command(flatten)]
    graph: GraphArgs,

    /// Independent graph realisations
    #[arg(long)]
    batches: Option<usize>,

    /// Runs per batch and parameter point
    #[arg(short = 'i', long)]
    iterations: Option<usize>,

    /// Initially infected nodes per run
    #[arg(long)]
    initial_infected: Option<usize>,

    /// Recovery rate
    #[arg(long)]
    gamma: Option<f64>,

    /// Logical end time of each run
    #[arg(long)]
    horizon: Option<f64>,

    /// Target-degree exponent
    #[arg(long, allow_negative_numbers = true)]
    beta: Option<f64>,

    /// Source-degree exponents, comma separated
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    alphas: Option<Vec<f64>>,

    /// Smallest lambda of the grid
    #[arg(long, default_value = "0")]
    lambda_min: f64,

    /// Largest lambda of the grid
    #[arg(long, default_value = "1.5")]
    lambda_max: f64,

    /// Lambda grid spacing
    #[arg(long, default_value = "0.01")]
    lambda_step: f64,

    /// Write every state change instead of the final state only
    #[arg(long)]
    time_series: bool,

    /// Base seed of the graph realisations
    #[arg(long)]
    graph_seed: Option<u64>,

    /// Base seed of the initial-infected draws
    #[arg(long)]
    init_seed: Option<u64>,

    /// Base seed of the runs
    #[arg(long)]
    sim_seed: Option<u64>,

    /// Output directory
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,
}

impl SpreadArgs {
    fn apply(&self, mut config: SpreadSweepConfig) -> SpreadSweepConfig {
        let graph_seed = self.graph_seed.unwrap_or(config.graph_seed);
        let init_seed = self.init_seed.unwrap_or(config.init_seed);
        let sim_seed = self.sim_seed.unwrap_or(config.sim_seed);
        let graph = self.graph.spec(config.graph.clone());
        config = config
            .with_graph(graph)
            .with_lambdas(arange(self.lambda_min, self.lambda_max, self.lambda_step))
            .with_seeds(graph_seed, init_seed, sim_seed);
        if let Some(batches) = self.batches {
            config = config.with_batches(batches);
        }
        if let Some(iterations) = self.iterations {
            config = config.with_iterations(iterations);
        }
        if let Some(k0) = self.initial_infected {
            config = config.with_initial_infected(k0);
        }
        if let Some(gamma) = self.gamma {
            config = config.with_gamma(gamma);
        }
        if let Some(horizon) = self.horizon {
            config = config.with_horizon(horizon);
        }
        if let Some(beta) = self.beta {
            config = config.with_beta(beta);
        }
        if let Some(alphas) = &self.alphas {
            config = config.with_alphas(alphas.clone());
        }
        if self.time_series {
            config = config.with_output(OutputMode::TimeSeries);
        }
        if let Some(dir) = &self.output_dir {
            config = config.with_output_dir(dir);
        }
        config
    }
}

#[derive(Args, Debug)]
struct VacArgs {
    #[command(flatten)]
    graph: GraphArgs,

    /// Vaccination probability per exposure
    #[arg(long, default_value = "0.45")]
    omega: f64,

    /// Infection probability per exposure
    #[arg(long, default_value = "0.168")]
    beta: f64,

    /// Steps a node stays infectious
    #[arg(long, default_value = "3")]
    gamma: u32,

    /// Steps per run
    #[arg(long, default_value = "120")]
    steps: u32,

    /// Vaccination cap as a fraction of the population
    #[arg(long, default_value = "0.5")]
    vac_max: f64,

    /// Vaccination reach: 1 for neighbours, 2 for second neighbours too
    #[arg(long, default_value = "1")]
    radius: u8,

    /// Number of runs
    #[arg(short = 'i', long, default_value = "40")]
    iterations: usize,

    /// Initially infected nodes per run
    #[arg(long, default_value = "1")]
    initial_infected: usize,

    /// Graph seed
    #[arg(long, default_value = "42")]
    graph_seed: u64,

    /// Base seed of the initial-infected draws
    #[arg(long, default_value = "7")]
    init_seed: u64,

    /// Base seed of the runs
    #[arg(long, default_value = "12345")]
    sim_seed: u64,

    /// Output directory
    #[arg(short = 'o', long, default_value = "out/vacsir")]
    output_dir: PathBuf,
}

#[derive(Args, Debug)]
struct KcoreArgs {
    /// Number of nodes
    #[arg(short = 'n', long, default_value = "10000")]
    nodes: usize,

    /// Mean degree of each generated graph
    #[arg(short = 'z', long, default_value = "10")]
    mean_degree: f64,

    /// Core order
    #[arg(short = 'k', long, default_value = "3")]
    k: usize,

    /// Smallest occupancy probability
    #[arg(long, default_value = "0")]
    p_min: f64,

    /// Largest occupancy probability
    #[arg(long, default_value = "1")]
    p_max: f64,

    /// Occupancy values, both ends included
    #[arg(long, default_value = "51")]
    steps: usize,

    /// Graph realisations per occupancy value
    #[arg(long, default_value = "20")]
    trials: usize,

    /// Base seed
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Output CSV path
    #[arg(short = 'o', long, default_value = "out/kcore/percolation.csv")]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    graph: GraphArgs,

    /// Transmission rate
    #[arg(long, default_value = "1")]
    lambda: f64,

    /// Recovery rate
    #[arg(long, default_value = "1")]
    gamma: f64,

    /// Logical end time
    #[arg(long, default_value = "200")]
    horizon: f64,

    /// Source-degree exponent
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    alpha: f64,

    /// Target-degree exponent
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    beta: f64,

    /// Run SAR with this activation threshold instead of SIR
    #[arg(long)]
    threshold: Option<u32>,

    /// Initially infected nodes
    #[arg(long, default_value = "1")]
    initial_infected: usize,

    /// Random seed for reproducible results. When omitted, a random seed is used.
    #[arg(long)]
    seed: Option<u64>,

    /// Output directory
    #[arg(short = 'o', long, default_value = "out/run")]
    output_dir: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,sirsim=info,sirsim_simulator=info")),
        )
        .init();

    let cli = Cli::parse();

    if let Some(threads) = cli.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            warn!(error = %e, threads, "Could not size the worker pool");
        }
    }

    if let Err(e) = execute(cli.command) {
        error!(error = %e, "Command failed");
        std::process::exit(1);
    }
}

fn execute(command: Command) -> Result<(), SimulatorError> {
    match command {
        Command::Sir(spread) => {
            let config = spread.apply(SpreadSweepConfig::sir());
            let summary = run_spread_sweep(&config)?;
            info!(runs = summary.runs, files = summary.files.len(), "SIR sweep written");
        }
        Command::Sar { threshold, spread } => {
            let config = spread.apply(SpreadSweepConfig::sar(threshold));
            let summary = run_spread_sweep(&config)?;
            info!(runs = summary.runs, files = summary.files.len(), "SAR sweep written");
        }
        Command::Vacsir(args) => {
            let model = VacSirConfig::default()
                .with_omega(args.omega)
                .with_beta(args.beta)
                .with_gamma(args.gamma)
                .with_steps(args.steps)
                .with_vac_max(args.vac_max)
                .with_radius(args.radius);
            let config = VacSweepConfig::default()
                .with_graph(args.graph.spec(GraphSpec::mean_degree(10_000, 10.0)))
                .with_model(model)
                .with_iterations(args.iterations)
                .with_initial_infected(args.initial_infected)
                .with_seeds(args.graph_seed, args.init_seed, args.sim_seed)
                .with_output_dir(args.output_dir);
            run_vacsir_sweep(&config)?;
        }
        Command::Kcore(args) => {
            let config = PercolationSweepConfig::default()
                .with_nodes(args.nodes)
                .with_mean_degree(args.mean_degree)
                .with_k(args.k)
                .with_range(args.p_min, args.p_max, args.steps)
                .with_trials(args.trials)
                .with_seed(args.seed)
                .with_output(args.output);
            let (rows, path) = run_percolation_sweep(&config)?;
            info!(points = rows.len(), path = %path.display(), "Percolation sweep written");
        }
        Command::Graph {
            graph,
            seed,
            output,
        } => {
            let seed = seed.unwrap_or_else(rand::random);
            let g = graph.spec(GraphSpec::default()).build(seed)?;
            let path = resolve_indexed(&output);
            g.save_edgelist(&path)?;
            info!(
                nodes = g.node_count(),
                edges = g.edge_count(),
                mean_degree = g.mean_degree(),
                seed,
                path = %path.display(),
                "Graph written"
            );
        }
        Command::Run(args) => run_single(args)?,
    }
    Ok(())
}

fn run_single(args: RunArgs) -> Result<(), SimulatorError> {
    let seed = args.seed.unwrap_or_else(rand::random);
    let graph = args.graph.spec(GraphSpec::mean_degree(10_000, 10.0)).build(seed)?;
    let initial = SimRng::stream(seed, 1)
        .sample_unique(graph.node_count(), args.initial_infected)
        .ok_or_else(|| {
            SimulatorError::InvalidSweep(format!(
                "cannot seed {} nodes in a graph of {}",
                args.initial_infected,
                graph.node_count()
            ))
        })?;
    let params = SpreadParams::new(args.lambda, args.gamma, args.horizon)
        .with_alpha(args.alpha)
        .with_beta(args.beta);

    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        seed,
        lambda = params.lambda,
        gamma = params.gamma,
        threshold = ?args.threshold,
        "Starting run"
    );
    let result = match args.threshold {
        None => simulate_sir(&graph, params, &initial, seed)?,
        Some(t) => simulate_sar(&graph, params, vec![t; graph.node_count()], &initial, seed)?,
    };

    let series = save_time_series(&result, &args.output_dir.join("timeseries.csv"))?;
    let nodes = save_node_times(&result, &args.output_dir.join("nodes.csv"))?;
    let peak = result.peak();
    info!(
        final_size = result.final_size(),
        attack_rate = result.attack_rate(),
        peak_time = peak.time,
        peak_infectious = peak.counts.infectious,
        events = result.stats().events_processed,
        series = %series.display(),
        nodes = %nodes.display(),
        "Run complete"
    );
    Ok(())
}
