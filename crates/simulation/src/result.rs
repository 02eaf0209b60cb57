//! Append-only record of one propagation run.

use serde::{Deserialize, Serialize};
use sirsim_types::{CompartmentCounts, ModelKind, NodeIndex};

/// Compartment counts right after a state change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: f64,
    pub counts: CompartmentCounts,
}

/// Event bookkeeping for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Events popped before the horizon.
    pub events_processed: u64,
    /// Popped events whose time no longer matched the node's authoritative
    /// time, or whose node had already moved on.
    pub stale_events: u64,
    /// Valid transmissions that only raised an exposure count (SAR).
    pub sub_threshold_exposures: u64,
    /// State changes, one per recorded sample after the first.
    pub transitions: u64,
    /// Events left unprocessed because they fell at or after the horizon.
    pub discarded_at_horizon: u64,
}

/// Output of a SIR or SAR run.
///
/// Samples are in non-decreasing time order and consecutive samples differ
/// by exactly one node moving between two compartments. The first sample is
/// always the all-susceptible state at `t = 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadResult {
    model: ModelKind,
    node_count: usize,
    samples: Vec<Sample>,
    infected_at: Vec<Option<f64>>,
    recovered_at: Vec<Option<f64>>,
    stats: RunStats,
}

impl SpreadResult {
    pub(crate) fn new(model: ModelKind, node_count: usize) -> Self {
        Self {
            model,
            node_count,
            samples: Vec::new(),
            infected_at: vec![None; node_count],
            recovered_at: vec![None; node_count],
            stats: RunStats::default(),
        }
    }

    pub(crate) fn record(&mut self, time: f64, counts: CompartmentCounts) {
        self.samples.push(Sample { time, counts });
    }

    pub(crate) fn mark_infected(&mut self, node: NodeIndex, time: f64) {
        self.infected_at[node as usize] = Some(time);
    }

    pub(crate) fn mark_recovered(&mut self, node: NodeIndex, time: f64) {
        self.recovered_at[node as usize] = Some(time);
    }

    pub(crate) fn set_stats(&mut self, stats: RunStats) {
        self.stats = stats;
    }

    pub fn model(&self) -> ModelKind {
        self.model
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Time the node became infectious/active, if it ever did.
    pub fn infected_at(&self, node: NodeIndex) -> Option<f64> {
        self.infected_at.get(node as usize).copied().flatten()
    }

    /// Time the node recovered, if it ever did.
    pub fn recovered_at(&self, node: NodeIndex) -> Option<f64> {
        self.recovered_at.get(node as usize).copied().flatten()
    }

    /// `(node, infected_at, recovered_at)` for every node in index order.
    pub fn node_times(&self) -> impl Iterator<Item = (NodeIndex, Option<f64>, Option<f64>)> + '_ {
        self.infected_at
            .iter()
            .zip(self.recovered_at.iter())
            .enumerate()
            .map(|(u, (&i, &r))| (u as NodeIndex, i, r))
    }

    /// Last recorded sample.
    pub fn final_sample(&self) -> Sample {
        self.samples.last().copied().unwrap_or(Sample {
            time: 0.0,
            counts: CompartmentCounts::all_susceptible(self.node_count),
        })
    }

    pub fn final_counts(&self) -> CompartmentCounts {
        self.final_sample().counts
    }

    /// Nodes ever infected by the end of the run, seeds included.
    pub fn final_size(&self) -> usize {
        self.final_counts().ever_infected()
    }

    /// `final_size / n`, or 0 for an empty population.
    pub fn attack_rate(&self) -> f64 {
        if self.node_count == 0 {
            0.0
        } else {
            self.final_size() as f64 / self.node_count as f64
        }
    }

    /// Earliest sample with the largest infectious count.
    pub fn peak(&self) -> Sample {
        let mut best = self.final_sample();
        for sample in &self.samples {
            if sample.counts.infectious > best.counts.infectious
                || (sample.counts.infectious == best.counts.infectious && sample.time < best.time)
            {
                best = *sample;
            }
        }
        best
    }

    /// Counts in effect at time `t`: the last sample recorded at or before it.
    pub fn counts_at(&self, t: f64) -> CompartmentCounts {
        let idx = self.samples.partition_point(|s| s.time <= t);
        match idx.checked_sub(1) {
            Some(i) => self.samples[i].counts,
            None => CompartmentCounts::all_susceptible(self.node_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(s: usize, i: usize, r: usize) -> CompartmentCounts {
        CompartmentCounts {
            susceptible: s,
            infectious: i,
            recovered: r,
            vaccinated: 0,
        }
    }

    fn sample_result() -> SpreadResult {
        let mut result = SpreadResult::new(ModelKind::Sir, 3);
        result.record(0.0, counts(3, 0, 0));
        result.record(0.0, counts(2, 1, 0));
        result.mark_infected(0, 0.0);
        result.record(0.5, counts(1, 2, 0));
        result.mark_infected(2, 0.5);
        result.record(1.25, counts(1, 1, 1));
        result.mark_recovered(0, 1.25);
        result
    }

    #[test]
    fn test_final_and_peak() {
        let result = sample_result();
        assert_eq!(result.final_counts(), counts(1, 1, 1));
        assert_eq!(result.final_size(), 2);
        assert!((result.attack_rate() - 2.0 / 3.0).abs() < 1e-12);

        let peak = result.peak();
        assert_eq!(peak.time, 0.5);
        assert_eq!(peak.counts.infectious, 2);
    }

    #[test]
    fn test_counts_at_steps_through_samples() {
        let result = sample_result();
        assert_eq!(result.counts_at(-1.0), counts(3, 0, 0));
        assert_eq!(result.counts_at(0.0), counts(2, 1, 0));
        assert_eq!(result.counts_at(0.7), counts(1, 2, 0));
        assert_eq!(result.counts_at(100.0), counts(1, 1, 1));
    }

    #[test]
    fn test_node_times() {
        let result = sample_result();
        let rows: Vec<_> = result.node_times().collect();
        assert_eq!(
            rows,
            vec![(0, Some(0.0), Some(1.25)), (1, None, None), (2, Some(0.5), None)]
        );
        assert_eq!(result.infected_at(7), None);
    }
}
