//! sirsim sweep runner
//!
//! Batch experiments built on top of `sirsim-simulation`, plus the CSV and
//! JSON export they produce.
//!
//! # Architecture
//!
//! - **Configuration**: builder-style sweep configs with the defaults of the
//!   reference experiments
//! - **Sweeps**: SIR/SAR parameter grids over graph batches, repeated VacSIR
//!   runs, and k-core percolation curves, parallelised with rayon
//! - **Statistics**: final-size distributions per parameter point
//! - **Output**: flat CSV files that never overwrite earlier results
//!
//! # Example
//!
//! ```ignore
//! use sirsim_simulator::{run_spread_sweep, GraphSpec, SpreadSweepConfig};
//!
//! let config = SpreadSweepConfig::sir()
//!     .with_graph(GraphSpec::mean_degree(10_000, 10.0))
//!     .with_batches(4)
//!     .with_lambdas(vec![0.1, 0.2, 0.4]);
//!
//! let summary = run_spread_sweep(&config)?;
//! for point in &summary.points {
//!     println!("{} {} -> {:.3}", point.alpha, point.lambda, point.mean_attack_rate);
//! }
//! ```

pub mod config;
mod error;
pub mod grid;
pub mod output;
pub mod percolation;
pub mod stats;
pub mod sweep;
pub mod vaccination;

pub use config::{
    Contagion, GraphKind, GraphSpec, OutputMode, PercolationSweepConfig, SpreadSweepConfig,
    VacSweepConfig,
};
pub use error::SimulatorError;
pub use grid::{arange, linspace};
pub use output::{resolve_indexed, save_node_times, save_time_series, CsvSink};
pub use percolation::run_percolation_sweep;
pub use stats::{FinalSizeStats, PointSummary, SweepSummary};
pub use sweep::run_spread_sweep;
pub use vaccination::{run_vacsir_sweep, VacSweepReport};
