//! Final-size statistics aggregated over sweep runs.

use crate::SimulatorError;
use hdrhistogram::Histogram;
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Distribution of outbreak final sizes at one parameter point.
///
/// Percentiles come from an HDR histogram with three significant digits.
/// Mean and deviation are tracked exactly alongside it.
#[derive(Clone, Debug)]
pub struct FinalSizeStats {
    histogram: Histogram<u64>,
    sum: f64,
    sum_sq: f64,
}

impl FinalSizeStats {
    pub fn new() -> Result<Self, SimulatorError> {
        Ok(Self {
            histogram: Histogram::new(3)?,
            sum: 0.0,
            sum_sq: 0.0,
        })
    }

    pub fn record(&mut self, final_size: usize) -> Result<(), SimulatorError> {
        self.histogram.record(final_size as u64)?;
        let x = final_size as f64;
        self.sum += x;
        self.sum_sq += x * x;
        Ok(())
    }

    /// Fold another point's runs into this one.
    pub fn merge(&mut self, other: &Self) -> Result<(), SimulatorError> {
        self.histogram.add(&other.histogram)?;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
        Ok(())
    }

    pub fn runs(&self) -> u64 {
        self.histogram.len()
    }

    pub fn mean(&self) -> f64 {
        match self.runs() {
            0 => 0.0,
            n => self.sum / n as f64,
        }
    }

    /// Sample standard deviation; zero with fewer than two runs.
    pub fn std_dev(&self) -> f64 {
        let n = self.runs();
        if n < 2 {
            return 0.0;
        }
        let n = n as f64;
        let var = (self.sum_sq - self.sum * self.sum / n) / (n - 1.0);
        var.max(0.0).sqrt()
    }

    pub fn percentile(&self, quantile: f64) -> u64 {
        self.histogram.value_at_quantile(quantile)
    }

    pub fn max(&self) -> u64 {
        self.histogram.max()
    }
}

/// Summary of one `(alpha, lambda)` point.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PointSummary {
    pub alpha: f64,
    pub lambda: f64,
    pub runs: u64,
    pub mean_final_size: f64,
    pub std_final_size: f64,
    pub mean_attack_rate: f64,
    pub p50: u64,
    pub p90: u64,
    pub p99: u64,
    pub max: u64,
}

impl PointSummary {
    pub fn new(alpha: f64, lambda: f64, nodes: usize, stats: &FinalSizeStats) -> Self {
        let mean = stats.mean();
        Self {
            alpha,
            lambda,
            runs: stats.runs(),
            mean_final_size: mean,
            std_final_size: stats.std_dev(),
            mean_attack_rate: if nodes == 0 { 0.0 } else { mean / nodes as f64 },
            p50: stats.percentile(0.5),
            p90: stats.percentile(0.9),
            p99: stats.percentile(0.99),
            max: stats.max(),
        }
    }
}

/// Everything a spreading sweep produced.
#[derive(Clone, Debug, Serialize)]
pub struct SweepSummary {
    pub model: String,
    pub graph: String,
    pub nodes: usize,
    pub batches: usize,
    pub iterations: usize,
    pub runs: u64,
    pub files: Vec<PathBuf>,
    pub points: Vec<PointSummary>,
}

impl SweepSummary {
    /// Point closest to `(alpha, lambda)`.
    pub fn point(&self, alpha: f64, lambda: f64) -> Option<&PointSummary> {
        self.points.iter().min_by(|a, b| {
            let da = (a.alpha - alpha).abs() + (a.lambda - lambda).abs();
            let db = (b.alpha - alpha).abs() + (b.lambda - lambda).abs();
            da.total_cmp(&db)
        })
    }

    /// Write as pretty JSON, creating parent directories.
    pub fn write_json(&self, path: &Path) -> Result<(), SimulatorError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}
