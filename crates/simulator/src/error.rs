//! Error type for sweeps and export.

use sirsim_graph::GraphError;
use sirsim_simulation::SimulationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulatorError {
    /// A sweep parameter is out of range or inconsistent.
    #[error("invalid sweep configuration: {0}")]
    InvalidSweep(String),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("simulation error: {0}")]
    Simulation(#[from] SimulationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("histogram error: {0}")]
    HistogramCreation(#[from] hdrhistogram::CreationError),

    #[error("histogram error: {0}")]
    HistogramRecord(#[from] hdrhistogram::RecordError),

    #[error("histogram error: {0}")]
    HistogramMerge(#[from] hdrhistogram::AdditionError),
}

impl SimulatorError {
    pub(crate) fn sweep(message: impl Into<String>) -> Self {
        Self::InvalidSweep(message.into())
    }
}
