// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::WindowOutcome;
use picks_core::{Phase, samples_to_seconds};
use std::collections::HashMap;

/// Experiment dimension residuals are partitioned by: a train-size (or other
/// configuration) label plus the random seed of the run.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExperimentKey {
    pub label: String,
    pub seed: u64,
}

impl ExperimentKey {
    pub fn new(label: impl Into<String>, seed: u64) -> Self {
        Self {
            label: label.into(),
            seed,
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResidualKey {
    pub phase: Phase,
    pub experiment: ExperimentKey,
}

/// Concatenated residuals for one key, in window processing order.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResidualSeries {
    pub true_positive: Vec<i64>,
    pub false_positive: Vec<i64>,
}

impl ResidualSeries {
    fn extend_from(&mut self, true_positive: &[i64], false_positive: &[i64]) {
        self.true_positive.extend_from_slice(true_positive);
        self.false_positive.extend_from_slice(false_positive);
    }

    pub fn true_positive_summary(&self) -> Option<ResidualSummary> {
        ResidualSummary::from_samples(&self.true_positive)
    }

    pub fn false_positive_summary(&self) -> Option<ResidualSummary> {
        ResidualSummary::from_samples(&self.false_positive)
    }
}

/// Count, mean, median and population standard deviation of a residual
/// sequence.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResidualSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

impl ResidualSummary {
    /// Returns `None` for an empty sequence.
    pub fn from_samples(residuals: &[i64]) -> Option<Self> {
        if residuals.is_empty() {
            return None;
        }

        let count = residuals.len();
        let total = residuals.iter().map(|&value| i128::from(value)).sum::<i128>();
        let mean = total as f64 / count as f64;
        let variance = residuals
            .iter()
            .map(|&value| {
                let delta = value as f64 - mean;
                delta * delta
            })
            .sum::<f64>()
            / count as f64;

        let mut sorted = residuals.to_vec();
        sorted.sort_unstable();
        let mid = count / 2;
        let median = if count % 2 == 1 {
            sorted[mid] as f64
        } else {
            (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
        };

        Some(Self {
            count,
            mean,
            median,
            std_dev: variance.sqrt(),
        })
    }

    /// Re-expresses a sample-unit summary in seconds.
    pub fn in_seconds(&self, sampling_rate_hz: f64) -> Self {
        Self {
            count: self.count,
            mean: samples_to_seconds(self.mean, sampling_rate_hz),
            median: samples_to_seconds(self.median, sampling_rate_hz),
            std_dev: samples_to_seconds(self.std_dev, sampling_rate_hz),
        }
    }
}

/// Collects TP and FP residuals keyed by phase and experiment.
///
/// Keys keep their first-insertion order and every series keeps append
/// order; nothing is deduplicated or sorted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResidualCollector {
    entries: Vec<(ResidualKey, ResidualSeries)>,
    positions: HashMap<ResidualKey, usize>,
}

impl ResidualCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one window's residuals for `phase` under `experiment`.
    pub fn append(&mut self, phase: Phase, experiment: &ExperimentKey, outcome: &WindowOutcome) {
        let key = ResidualKey {
            phase,
            experiment: experiment.clone(),
        };
        self.append_residuals(key, &outcome.tp_residuals, &outcome.fp_residuals);
    }

    pub fn append_residuals(
        &mut self,
        key: ResidualKey,
        true_positive: &[i64],
        false_positive: &[i64],
    ) {
        self.series_mut(key).extend_from(true_positive, false_positive);
    }

    /// Appends every series of `other` after the ones already held.
    pub fn merge(&mut self, other: ResidualCollector) {
        for (key, series) in other.entries {
            self.series_mut(key)
                .extend_from(&series.true_positive, &series.false_positive);
        }
    }

    pub fn get(&self, key: &ResidualKey) -> Option<&ResidualSeries> {
        self.positions
            .get(key)
            .map(|&position| &self.entries[position].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResidualKey, &ResidualSeries)> {
        self.entries.iter().map(|(key, series)| (key, series))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Concatenates every seed recorded under `label` for `phase`, in the
    /// order the seeds were first seen.
    pub fn pooled(&self, phase: Phase, label: &str) -> ResidualSeries {
        let mut pooled = ResidualSeries::default();
        for (key, series) in &self.entries {
            if key.phase == phase && key.experiment.label == label {
                pooled.extend_from(&series.true_positive, &series.false_positive);
            }
        }
        pooled
    }

    /// Distinct labels in first-seen order.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for (key, _) in &self.entries {
            let label = key.experiment.label.as_str();
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        labels
    }

    fn series_mut(&mut self, key: ResidualKey) -> &mut ResidualSeries {
        let position = match self.positions.get(&key) {
            Some(&position) => position,
            None => {
                let position = self.entries.len();
                self.positions.insert(key.clone(), position);
                self.entries.push((key, ResidualSeries::default()));
                position
            }
        };
        &mut self.entries[position].1
    }
}
