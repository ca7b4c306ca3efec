// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Scores extracted picks against reference picks.
//!
//! Each window is matched on its own into an immutable [`WindowOutcome`];
//! [`PickEvaluator`] folds outcomes in window order into cumulative counts,
//! [`Scores`] and per-experiment residual series.

pub mod evaluator;
pub mod matching;
pub mod report;
pub mod residuals;
pub mod scores;
pub mod stats;

pub use evaluator::{
    EvaluationWindow, PhaseEvaluation, PhaseWindow, PickEvaluator, WindowEvaluation,
    evaluate_phase, evaluate_window,
};
pub use matching::{PickMatch, WindowOutcome, compare_picks, match_picks};
pub use report::{EvaluationReport, PhaseReport, ScoreMap, ScoreValue};
pub use residuals::{
    ExperimentKey, ResidualCollector, ResidualKey, ResidualSeries, ResidualSummary,
};
pub use scores::{SCORE_EPSILON, Scores, calculate_scores};
pub use stats::PickStats;
