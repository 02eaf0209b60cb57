//! Flat CSV export.
//!
//! Times and rates are written with nine decimals, absent timestamps as empty
//! cells. Files are never overwritten: a fresh export to an existing path
//! goes to `name (1).ext`, `name (2).ext`, ... instead. Append mode writes
//! into the given path and only emits the header when the file is empty.

use crate::SimulatorError;
use serde::{Serialize, Serializer};
use sirsim_simulation::SpreadResult;
use sirsim_types::{Compartment, ModelKind, NodeIndex};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// `path` if it does not exist yet, otherwise the first free
/// `stem (i).ext` next to it.
pub fn resolve_indexed(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    // A leading dot marks a hidden file, not an extension.
    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(dot),
        _ => (name.as_str(), ""),
    };
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    (1..)
        .map(|i| dir.join(format!("{stem} ({i}){ext}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}

fn fixed<S: Serializer>(value: f64, decimals: usize, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_nan() {
        serializer.serialize_str("")
    } else {
        serializer.serialize_str(&format!("{value:.decimals$}"))
    }
}

fn fixed9<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    fixed(*value, 9, serializer)
}

fn fixed9_opt<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    fixed(value.unwrap_or(f64::NAN), 9, serializer)
}

fn fixed8<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    fixed(*value, 8, serializer)
}

fn fixed3<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    fixed(*value, 3, serializer)
}

/// One row of a sweep batch file.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SweepRow {
    pub itr: usize,
    #[serde(serialize_with = "fixed9")]
    pub alpha: f64,
    #[serde(serialize_with = "fixed9")]
    pub beta: f64,
    #[serde(serialize_with = "fixed9")]
    pub lambda: f64,
    #[serde(serialize_with = "fixed9")]
    pub time: f64,
    pub infectious: usize,
    pub recovered: usize,
}

/// Header of a sweep batch file. SAR names the middle compartment `A`.
pub fn sweep_header(model: ModelKind) -> [&'static str; 7] {
    [
        "itr",
        "alpha",
        "beta",
        "lambda",
        "time",
        Compartment::Infectious.label(model),
        "R",
    ]
}

#[derive(Debug, Clone, Copy, Serialize)]
struct TimeSeriesRow {
    #[serde(serialize_with = "fixed9")]
    time: f64,
    susceptible: usize,
    infectious: usize,
    recovered: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    itr: Option<usize>,
}

#[derive(Debug, Clone, Copy, Serialize)]
struct NodeTimesRow {
    node: NodeIndex,
    #[serde(skip_serializing_if = "Option::is_none")]
    itr: Option<usize>,
    #[serde(serialize_with = "fixed9_opt")]
    infected_at: Option<f64>,
    #[serde(serialize_with = "fixed9_opt")]
    recovered_at: Option<f64>,
}

/// One step of a vaccination run.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VacRow {
    pub itr: usize,
    pub t: usize,
    pub susceptible: usize,
    pub infectious: usize,
    pub vaccinated: usize,
    pub recovered: usize,
}

pub const VAC_HEADER: [&str; 6] = ["itr", "t", "S", "I", "V", "R"];

/// One occupancy value of a k-core percolation sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercolationRow {
    #[serde(serialize_with = "fixed8")]
    pub p: f64,
    #[serde(serialize_with = "fixed8")]
    pub frac_kcore: f64,
    #[serde(serialize_with = "fixed8")]
    pub frac_std: f64,
    #[serde(serialize_with = "fixed3")]
    pub size_mean: f64,
    #[serde(serialize_with = "fixed3")]
    pub size_std: f64,
}

pub const PERCOLATION_HEADER: [&str; 5] = ["p", "frac_kcore", "frac_std", "size_mean", "size_std"];

/// Header-aware CSV writer over a file.
pub struct CsvSink {
    writer: csv::Writer<BufWriter<File>>,
    path: PathBuf,
}

impl CsvSink {
    /// Open `path` for writing.
    ///
    /// Without `append` the path is first passed through
    /// [`resolve_indexed`], so the file is always new. Parent directories
    /// are created as needed.
    pub fn open(path: &Path, header: &[&str], append: bool) -> Result<Self, SimulatorError> {
        let path = if append {
            path.to_path_buf()
        } else {
            resolve_indexed(path)
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let needs_header = match fs::metadata(&path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };
        let file = OpenOptions::new()
            .create(true)
            .append(append)
            .write(true)
            .truncate(!append)
            .open(&path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(file));
        if needs_header {
            writer.write_record(header)?;
        }
        debug!(path = %path.display(), append, "Opened CSV output");
        Ok(Self { writer, path })
    }

    /// Path actually written to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn serialize<T: Serialize>(&mut self, row: T) -> Result<(), SimulatorError> {
        self.writer.serialize(row)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), SimulatorError> {
        self.writer.flush()?;
        Ok(())
    }
}

fn series_header(model: ModelKind, with_itr: bool) -> Vec<&'static str> {
    let mut header = vec!["time"];
    header.extend(model.compartments().iter().map(|c| c.label(model)));
    if with_itr {
        header.push("itr");
    }
    header
}

fn time_series_rows(
    result: &SpreadResult,
    itr: Option<usize>,
) -> impl Iterator<Item = TimeSeriesRow> + '_ {
    result.samples().iter().map(move |s| TimeSeriesRow {
        time: s.time,
        susceptible: s.counts.susceptible,
        infectious: s.counts.infectious,
        recovered: s.counts.recovered,
        itr,
    })
}

fn node_time_rows(
    result: &SpreadResult,
    itr: Option<usize>,
) -> impl Iterator<Item = NodeTimesRow> + '_ {
    result
        .node_times()
        .map(move |(node, infected_at, recovered_at)| NodeTimesRow {
            node,
            itr,
            infected_at,
            recovered_at,
        })
}

/// Write `time,S,I,R` (or `time,S,A,R`) rows, one per sample.
pub fn write_time_series<W: Write>(result: &SpreadResult, writer: W) -> Result<(), SimulatorError> {
    let mut csv = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    csv.write_record(series_header(result.model(), false))?;
    for row in time_series_rows(result, None) {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Write `node,infected_at,recovered_at` rows for every node.
pub fn write_node_times<W: Write>(result: &SpreadResult, writer: W) -> Result<(), SimulatorError> {
    let mut csv = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    csv.write_record(["node", "infected_at", "recovered_at"])?;
    for row in node_time_rows(result, None) {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Save the time series of one run to a new file. Returns the path used.
pub fn save_time_series(result: &SpreadResult, path: &Path) -> Result<PathBuf, SimulatorError> {
    let mut sink = CsvSink::open(path, &series_header(result.model(), false), false)?;
    for row in time_series_rows(result, None) {
        sink.serialize(row)?;
    }
    sink.flush()?;
    Ok(sink.path().to_path_buf())
}

/// Append the time series of iteration `itr` (`time,S,I,R,itr`).
pub fn append_time_series(result: &SpreadResult, path: &Path, itr: usize) -> Result<(), SimulatorError> {
    let mut sink = CsvSink::open(path, &series_header(result.model(), true), true)?;
    for row in time_series_rows(result, Some(itr)) {
        sink.serialize(row)?;
    }
    sink.flush()
}

/// Save per-node timestamps of one run to a new file. Returns the path used.
pub fn save_node_times(result: &SpreadResult, path: &Path) -> Result<PathBuf, SimulatorError> {
    let mut sink = CsvSink::open(path, &["node", "infected_at", "recovered_at"], false)?;
    for row in node_time_rows(result, None) {
        sink.serialize(row)?;
    }
    sink.flush()?;
    Ok(sink.path().to_path_buf())
}

/// Append per-node timestamps of iteration `itr`
/// (`node,itr,infected_at,recovered_at`).
pub fn append_node_times(result: &SpreadResult, path: &Path, itr: usize) -> Result<(), SimulatorError> {
    let mut sink = CsvSink::open(path, &["node", "itr", "infected_at", "recovered_at"], true)?;
    for row in node_time_rows(result, Some(itr)) {
        sink.serialize(row)?;
    }
    sink.flush()
}
