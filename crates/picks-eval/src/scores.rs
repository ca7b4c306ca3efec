// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::PickStats;

/// Additive stabilizer in every score denominator.
pub const SCORE_EPSILON: f64 = 1e-6;

/// Precision/recall/F1 derived from cumulative counts.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scores {
    pub f1: f64,
    pub precision: f64,
    pub recall: f64,
}

/// Computes scores from accumulated counts.
///
/// Always call this on the cumulative [`PickStats`] of a run; averaging
/// per-window scores gives a different (wrong) answer.
pub fn calculate_scores(stats: &PickStats) -> Scores {
    let tp = stats.true_positives as f64;
    let fp = stats.false_positives as f64;
    let fn_ = stats.false_negatives as f64;

    let precision = tp / (tp + fp + SCORE_EPSILON);
    let recall = tp / (tp + fn_ + SCORE_EPSILON);
    let f1 = 2.0 * (precision * recall / (precision + recall + SCORE_EPSILON));

    Scores {
        f1,
        precision,
        recall,
    }
}
