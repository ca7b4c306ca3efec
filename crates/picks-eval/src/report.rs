// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::{ExperimentKey, PickStats, Scores, calculate_scores};
use picks_core::{EvalConfig, Phase, PickError};
use std::collections::BTreeMap;

/// Flat score dictionary keyed `"{phase}_{metric}"`, e.g. `P_TP`, `S_f1`.
pub type ScoreMap = BTreeMap<String, ScoreValue>;

/// A score dictionary entry: either a raw count or a derived ratio.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScoreValue {
    Count(usize),
    Ratio(f64),
}

impl ScoreValue {
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Count(value) => value as f64,
            Self::Ratio(value) => value,
        }
    }
}

/// Final counts and scores for one phase.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseReport {
    pub phase: Phase,
    pub stats: PickStats,
    pub scores: Scores,
}

impl PhaseReport {
    pub fn new(phase: Phase, stats: PickStats) -> Self {
        Self {
            phase,
            stats,
            scores: calculate_scores(&stats),
        }
    }

    /// Writes this phase's `TOTAL/TP/FP/FN/precision/recall/f1` entries.
    pub fn write_score_entries(&self, map: &mut ScoreMap) {
        let counts = [
            ("TOTAL", self.stats.total),
            ("TP", self.stats.true_positives),
            ("FP", self.stats.false_positives),
            ("FN", self.stats.false_negatives),
        ];
        for (name, value) in counts {
            map.insert(score_key(self.phase, name), ScoreValue::Count(value));
        }

        let ratios = [
            ("precision", self.scores.precision),
            ("recall", self.scores.recall),
            ("f1", self.scores.f1),
        ];
        for (name, value) in ratios {
            map.insert(score_key(self.phase, name), ScoreValue::Ratio(value));
        }
    }

    /// Reads a phase back from a persisted score dictionary.
    ///
    /// `TOTAL` may be absent (older dictionaries); it is then taken as
    /// `TP + FN`.
    pub fn from_score_map(phase: Phase, map: &ScoreMap) -> Result<Self, PickError> {
        let true_positives = read_count(map, phase, "TP")?;
        let false_positives = read_count(map, phase, "FP")?;
        let false_negatives = read_count(map, phase, "FN")?;
        let total = match map.get(&score_key(phase, "TOTAL")) {
            Some(_) => read_count(map, phase, "TOTAL")?,
            None => true_positives + false_negatives,
        };

        Ok(Self {
            phase,
            stats: PickStats {
                total,
                true_positives,
                false_positives,
                false_negatives,
            },
            scores: Scores {
                f1: read_ratio(map, phase, "f1")?,
                precision: read_ratio(map, phase, "precision")?,
                recall: read_ratio(map, phase, "recall")?,
            },
        })
    }
}

/// Summary of one experiment configuration after all windows were folded.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluationReport {
    pub experiment: ExperimentKey,
    pub windows: usize,
    pub config: EvalConfig,
    pub p: PhaseReport,
    pub s: PhaseReport,
}

impl EvaluationReport {
    pub fn phase(&self, phase: Phase) -> &PhaseReport {
        match phase {
            Phase::P => &self.p,
            Phase::S => &self.s,
        }
    }

    /// The reporting dictionary for both phases.
    pub fn score_map(&self) -> ScoreMap {
        let mut map = ScoreMap::new();
        for phase in Phase::ALL {
            self.phase(phase).write_score_entries(&mut map);
        }
        map
    }
}

fn score_key(phase: Phase, name: &str) -> String {
    format!("{}_{name}", phase.as_str())
}

fn read_entry(map: &ScoreMap, phase: Phase, name: &str) -> Result<ScoreValue, PickError> {
    let key = score_key(phase, name);
    map.get(&key)
        .copied()
        .ok_or_else(|| PickError::invalid_configuration(format!("score map is missing '{key}'")))
}

fn read_count(map: &ScoreMap, phase: Phase, name: &str) -> Result<usize, PickError> {
    match read_entry(map, phase, name)? {
        ScoreValue::Count(value) => Ok(value),
        ScoreValue::Ratio(value) => Err(PickError::invalid_configuration(format!(
            "score map entry '{}' must be a non-negative integer; got {value}",
            score_key(phase, name)
        ))),
    }
}

fn read_ratio(map: &ScoreMap, phase: Phase, name: &str) -> Result<f64, PickError> {
    Ok(read_entry(map, phase, name)?.as_f64())
}
