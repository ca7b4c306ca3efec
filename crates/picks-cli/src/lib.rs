// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use picks_core::{Phase, PickError, ValidatedEvalConfig};
use picks_eval::{
    EvaluationReport, EvaluationWindow, ExperimentKey, PickEvaluator, ResidualCollector,
    ResidualKey, ResidualSummary,
};
use serde::{Deserialize, Serialize};

/// A window that was left out of the run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SkippedWindow {
    pub position: usize,
    pub id: Option<String>,
    pub reason: String,
}

#[derive(Clone, Debug)]
pub struct EvalRun {
    pub report: EvaluationReport,
    pub residuals: ResidualCollector,
    pub skipped: Vec<SkippedWindow>,
}

/// Parses a window file: a JSON array of windows.
pub fn parse_windows_json(raw: &str) -> Result<Vec<EvaluationWindow>, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Evaluates `windows` for one experiment.
///
/// With `skip_invalid`, windows whose signal is rejected are logged and
/// recorded in [`EvalRun::skipped`]; any other error still aborts the run.
/// Without it, the first rejected window aborts the run.
pub fn run_eval(
    windows: &[EvaluationWindow],
    config: ValidatedEvalConfig,
    experiment: ExperimentKey,
    skip_invalid: bool,
) -> Result<EvalRun, PickError> {
    let mut evaluator = PickEvaluator::new(config, experiment);
    let mut skipped = Vec::new();

    if skip_invalid {
        for (position, window) in windows.iter().enumerate() {
            match evaluator.evaluate_window(window) {
                Ok(_) => {}
                Err(err @ PickError::InvalidSignal(_)) => {
                    tracing::warn!(
                        label = %evaluator.experiment().label,
                        position,
                        id = window.id.as_deref().unwrap_or(""),
                        error = %err,
                        "skipping window"
                    );
                    skipped.push(SkippedWindow {
                        position,
                        id: window.id.clone(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }
    } else {
        evaluator.evaluate_windows(windows)?;
    }

    let (report, residuals) = evaluator.finish();
    Ok(EvalRun {
        report,
        residuals,
        skipped,
    })
}

/// On-disk residual dump: raw series per (phase, label, seed) plus the
/// sampling rate needed to convert them to seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResidualDump {
    pub sampling_rate_hz: f64,
    pub series: Vec<ResidualDumpEntry>,
    /// Derived; ignored on read.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub summaries: Vec<PooledSummary>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResidualDumpEntry {
    pub phase: Phase,
    pub label: String,
    pub seed: u64,
    pub true_positive: Vec<i64>,
    pub false_positive: Vec<i64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummaryUnits {
    pub samples: ResidualSummary,
    pub seconds: ResidualSummary,
}

/// Residual summary of one label and phase, pooled over every seed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PooledSummary {
    pub phase: Phase,
    pub label: String,
    pub seeds: Vec<u64>,
    pub true_positive: Option<SummaryUnits>,
    pub false_positive: Option<SummaryUnits>,
}

impl ResidualDump {
    pub fn from_collector(residuals: &ResidualCollector, sampling_rate_hz: f64) -> Self {
        let series = residuals
            .iter()
            .map(|(key, series)| ResidualDumpEntry {
                phase: key.phase,
                label: key.experiment.label.clone(),
                seed: key.experiment.seed,
                true_positive: series.true_positive.clone(),
                false_positive: series.false_positive.clone(),
            })
            .collect();
        Self {
            sampling_rate_hz,
            series,
            summaries: Vec::new(),
        }
    }

    pub fn to_collector(&self) -> ResidualCollector {
        let mut collector = ResidualCollector::new();
        for entry in &self.series {
            collector.append_residuals(
                ResidualKey {
                    phase: entry.phase,
                    experiment: ExperimentKey::new(entry.label.clone(), entry.seed),
                },
                &entry.true_positive,
                &entry.false_positive,
            );
        }
        collector
    }

    /// Returns the dump with its summaries recomputed.
    pub fn with_summaries(mut self) -> Result<Self, PickError> {
        self.summaries = summarize_residuals(&self.to_collector(), self.sampling_rate_hz)?;
        Ok(self)
    }
}

/// Folds residual dumps in the given order into one collector.
///
/// Every dump must share one sampling rate; it is returned alongside the
/// collector.
pub fn merge_dumps(
    dumps: impl IntoIterator<Item = ResidualDump>,
) -> Result<(ResidualCollector, f64), PickError> {
    let mut merged: Option<(ResidualCollector, f64)> = None;
    for dump in dumps {
        let collector = dump.to_collector();
        match merged.as_mut() {
            None => merged = Some((collector, dump.sampling_rate_hz)),
            Some((residuals, rate)) => {
                if dump.sampling_rate_hz != *rate {
                    return Err(PickError::invalid_configuration(format!(
                        "residual dumps disagree on sampling_rate_hz: {} vs {}",
                        rate, dump.sampling_rate_hz
                    )));
                }
                residuals.merge(collector);
            }
        }
    }
    merged.ok_or_else(|| PickError::invalid_configuration("no residual dumps to merge"))
}

/// Pools residuals per label across seeds and summarizes them in samples and
/// seconds. Output follows label first-seen order, then P before S.
pub fn summarize_residuals(
    residuals: &ResidualCollector,
    sampling_rate_hz: f64,
) -> Result<Vec<PooledSummary>, PickError> {
    if !sampling_rate_hz.is_finite() || sampling_rate_hz <= 0.0 {
        return Err(PickError::invalid_configuration(format!(
            "sampling_rate_hz must be finite and > 0; got {sampling_rate_hz}"
        )));
    }

    let units = |summary: Option<ResidualSummary>| {
        summary.map(|samples| SummaryUnits {
            samples,
            seconds: samples.in_seconds(sampling_rate_hz),
        })
    };

    let mut summaries = Vec::new();
    for label in residuals.labels() {
        for phase in Phase::ALL {
            let seeds = residuals
                .iter()
                .filter(|(key, _)| key.phase == phase && key.experiment.label == label)
                .map(|(key, _)| key.experiment.seed)
                .collect::<Vec<_>>();
            if seeds.is_empty() {
                continue;
            }
            let pooled = residuals.pooled(phase, label);
            summaries.push(PooledSummary {
                phase,
                label: label.to_string(),
                seeds,
                true_positive: units(pooled.true_positive_summary()),
                false_positive: units(pooled.false_positive_summary()),
            });
        }
    }
    Ok(summaries)
}
