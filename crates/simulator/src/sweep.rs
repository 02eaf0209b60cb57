//! Parallel SIR/SAR parameter sweeps.
//!
//! Batches run on the rayon pool, one graph realisation each. Within a batch
//! runs are sequential and write to that batch's own CSV file, so no output
//! is shared between threads.

use crate::config::{Contagion, OutputMode, SpreadSweepConfig};
use crate::output::{resolve_indexed, sweep_header, CsvSink, SweepRow};
use crate::stats::{FinalSizeStats, PointSummary, SweepSummary};
use crate::SimulatorError;
use rayon::prelude::*;
use sirsim_core::SimRng;
use sirsim_graph::ContactGraph;
use sirsim_simulation::{simulate_sar, simulate_sir, SpreadParams, SpreadResult};
use sirsim_types::{ModelKind, NodeIndex};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Runs between progress log lines.
const PROGRESS_EVERY: u64 = 10_000;

struct BatchOutcome {
    path: PathBuf,
    nodes: usize,
    /// Indexed by `alpha_index * lambdas.len() + lambda_index`.
    stats: Vec<FinalSizeStats>,
}

struct Progress {
    done: AtomicU64,
    total: u64,
}

impl Progress {
    fn tick(&self) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if done % PROGRESS_EVERY == 0 || done == self.total {
            info!(done, total = self.total, "Sweep progress");
        }
    }
}

/// Run every batch of `config`, write one CSV per batch under
/// `output_dir/<graph label>/` and a `summary.json` beside them.
pub fn run_spread_sweep(config: &SpreadSweepConfig) -> Result<SweepSummary, SimulatorError> {
    config.validate()?;
    let model = match config.contagion {
        Contagion::Simple => ModelKind::Sir,
        Contagion::Threshold(_) => ModelKind::Sar,
    };
    let dir = config.output_dir.join(config.graph.label());
    let progress = Progress {
        done: AtomicU64::new(0),
        total: config.total_runs() as u64,
    };

    info!(
        %model,
        graph = %config.graph.label(),
        batches = config.batches,
        iterations = config.iterations,
        alphas = config.alphas.len(),
        lambdas = config.lambdas.len(),
        total_runs = progress.total,
        dir = %dir.display(),
        "Starting sweep"
    );
    let started = Instant::now();

    let outcomes = (0..config.batches)
        .into_par_iter()
        .map(|batch| run_batch(config, model, batch, &dir, &progress))
        .collect::<Result<Vec<_>, _>>()?;

    let summary = summarize(config, model, outcomes)?;
    summary.write_json(&resolve_indexed(&dir.join("summary.json")))?;

    info!(
        runs = summary.runs,
        files = summary.files.len(),
        elapsed_secs = started.elapsed().as_secs_f64(),
        "Sweep complete"
    );
    Ok(summary)
}

fn run_batch(
    config: &SpreadSweepConfig,
    model: ModelKind,
    batch: usize,
    dir: &Path,
    progress: &Progress,
) -> Result<BatchOutcome, SimulatorError> {
    let graph = config.graph.build(config.graph_seed.wrapping_add(batch as u64))?;
    let n = graph.node_count();
    if config.initial_infected > n {
        return Err(SimulatorError::sweep(format!(
            "cannot seed {} nodes in a graph of {n}",
            config.initial_infected
        )));
    }
    debug!(batch, nodes = n, edges = graph.edge_count(), "Built batch graph");

    let mut sink = CsvSink::open(
        &dir.join(format!("results_{batch:02}.csv")),
        &sweep_header(model),
        false,
    )?;
    let mut stats = (0..config.alphas.len() * config.lambdas.len())
        .map(|_| FinalSizeStats::new())
        .collect::<Result<Vec<_>, _>>()?;

    for itr in 0..config.iterations {
        let run_index = (batch * config.iterations + itr) as u64;
        let initial = SimRng::stream(config.init_seed, run_index)
            .sample_unique(n, config.initial_infected)
            .ok_or_else(|| SimulatorError::sweep("initial infected exceeds node count"))?;
        let seed = config.sim_seed.wrapping_add(run_index);

        for (a, &alpha) in config.alphas.iter().enumerate() {
            for (l, &lambda) in config.lambdas.iter().enumerate() {
                let params = SpreadParams::new(lambda, config.gamma, config.horizon)
                    .with_alpha(alpha)
                    .with_beta(config.beta);
                let result = run_once(&graph, config.contagion, params, &initial, seed)?;

                write_run(&mut sink, config.output, itr, &params, &result)?;
                stats[a * config.lambdas.len() + l].record(result.final_size())?;
                progress.tick();
            }
        }
    }

    sink.flush()?;
    debug!(batch, path = %sink.path().display(), "Batch complete");
    Ok(BatchOutcome {
        path: sink.path().to_path_buf(),
        nodes: n,
        stats,
    })
}

fn run_once(
    graph: &ContactGraph,
    contagion: Contagion,
    params: SpreadParams,
    initial: &[NodeIndex],
    seed: u64,
) -> Result<SpreadResult, SimulatorError> {
    let result = match contagion {
        Contagion::Simple => simulate_sir(graph, params, initial, seed)?,
        Contagion::Threshold(threshold) => simulate_sar(
            graph,
            params,
            vec![threshold; graph.node_count()],
            initial,
            seed,
        )?,
    };
    Ok(result)
}

fn write_run(
    sink: &mut CsvSink,
    mode: OutputMode,
    itr: usize,
    params: &SpreadParams,
    result: &SpreadResult,
) -> Result<(), SimulatorError> {
    let row = |time: f64, infectious: usize, recovered: usize| SweepRow {
        itr,
        alpha: params.alpha,
        beta: params.beta,
        lambda: params.lambda,
        time,
        infectious,
        recovered,
    };
    match mode {
        OutputMode::FinalState => {
            let last = result.final_sample();
            sink.serialize(row(last.time, last.counts.infectious, last.counts.recovered))
        }
        OutputMode::TimeSeries => {
            for sample in result.samples() {
                sink.serialize(row(
                    sample.time,
                    sample.counts.infectious,
                    sample.counts.recovered,
                ))?;
            }
            Ok(())
        }
    }
}

fn summarize(
    config: &SpreadSweepConfig,
    model: ModelKind,
    outcomes: Vec<BatchOutcome>,
) -> Result<SweepSummary, SimulatorError> {
    let nodes = outcomes.first().map(|o| o.nodes).unwrap_or(config.graph.nodes);
    let mut files = Vec::with_capacity(outcomes.len());
    let mut merged: Vec<FinalSizeStats> = Vec::new();
    for outcome in outcomes {
        files.push(outcome.path);
        if merged.is_empty() {
            merged = outcome.stats;
        } else {
            for (total, batch) in merged.iter_mut().zip(&outcome.stats) {
                total.merge(batch)?;
            }
        }
    }

    let points: Vec<PointSummary> = config
        .alphas
        .iter()
        .flat_map(|&alpha| config.lambdas.iter().map(move |&lambda| (alpha, lambda)))
        .zip(&merged)
        .map(|((alpha, lambda), stats)| PointSummary::new(alpha, lambda, nodes, stats))
        .collect();

    Ok(SweepSummary {
        model: model.to_string(),
        graph: config.graph.label(),
        nodes,
        batches: config.batches,
        iterations: config.iterations,
        runs: points.iter().map(|p| p.runs).sum(),
        files,
        points,
    })
}
