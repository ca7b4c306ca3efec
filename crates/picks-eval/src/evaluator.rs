// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::{
    EvaluationReport, ExperimentKey, PhaseReport, PickStats, ResidualCollector, WindowOutcome,
    match_picks,
};
use picks_core::{Phase, PickError, ValidatedEvalConfig};
use picks_extract::{CandidatePick, extract_picks};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Probability trace and reference picks of one phase in one window.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PhaseWindow {
    pub probabilities: Vec<f64>,
    pub references: Vec<usize>,
}

/// One evaluation window: a P trace and an S trace over the same samples.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EvaluationWindow {
    pub id: Option<String>,
    pub p: PhaseWindow,
    pub s: PhaseWindow,
}

impl EvaluationWindow {
    pub fn phase(&self, phase: Phase) -> &PhaseWindow {
        match phase {
            Phase::P => &self.p,
            Phase::S => &self.s,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PhaseEvaluation {
    pub picks: Vec<CandidatePick>,
    pub outcome: WindowOutcome,
}

/// Per-window result. Independent of every other window.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowEvaluation {
    pub p: PhaseEvaluation,
    pub s: PhaseEvaluation,
}

impl WindowEvaluation {
    pub fn phase(&self, phase: Phase) -> &PhaseEvaluation {
        match phase {
            Phase::P => &self.p,
            Phase::S => &self.s,
        }
    }
}

pub fn evaluate_phase(
    window: &PhaseWindow,
    config: &ValidatedEvalConfig,
) -> Result<PhaseEvaluation, PickError> {
    let extracted = extract_picks(&window.probabilities, config.extract())?;
    let outcome = match_picks(
        &extracted.indices(),
        &window.references,
        config.matching().tolerance,
    )?;
    Ok(PhaseEvaluation {
        picks: extracted.picks,
        outcome,
    })
}

/// Extracts and matches both phases of a window without touching any
/// accumulator.
pub fn evaluate_window(
    window: &EvaluationWindow,
    config: &ValidatedEvalConfig,
) -> Result<WindowEvaluation, PickError> {
    Ok(WindowEvaluation {
        p: evaluate_phase(&window.p, config)?,
        s: evaluate_phase(&window.s, config)?,
    })
}

/// Folds windows of one experiment into per-phase counts and residuals.
///
/// Every fold step is all-or-nothing: a window that fails to evaluate or
/// overflows a counter leaves the evaluator exactly as it was.
#[derive(Clone, Debug)]
pub struct PickEvaluator {
    config: ValidatedEvalConfig,
    experiment: ExperimentKey,
    p: PickStats,
    s: PickStats,
    windows: usize,
    residuals: ResidualCollector,
}

impl PickEvaluator {
    pub fn new(config: ValidatedEvalConfig, experiment: ExperimentKey) -> Self {
        Self {
            config,
            experiment,
            p: PickStats::default(),
            s: PickStats::default(),
            windows: 0,
            residuals: ResidualCollector::new(),
        }
    }

    pub fn experiment(&self) -> &ExperimentKey {
        &self.experiment
    }

    pub fn windows(&self) -> usize {
        self.windows
    }

    pub fn stats(&self, phase: Phase) -> &PickStats {
        match phase {
            Phase::P => &self.p,
            Phase::S => &self.s,
        }
    }

    pub fn residuals(&self) -> &ResidualCollector {
        &self.residuals
    }

    pub fn evaluate_window(
        &mut self,
        window: &EvaluationWindow,
    ) -> Result<WindowEvaluation, PickError> {
        let evaluation = evaluate_window(window, &self.config)?;
        self.absorb(&evaluation)?;
        Ok(evaluation)
    }

    /// Evaluates every window, then folds them in input order.
    ///
    /// With the `rayon` feature the per-window work runs in parallel; the
    /// fold is still sequential so counts and residual order match a
    /// serial run. On error nothing is folded.
    pub fn evaluate_windows(
        &mut self,
        windows: &[EvaluationWindow],
    ) -> Result<Vec<WindowEvaluation>, PickError> {
        let evaluations = evaluate_all(windows, &self.config)?;
        self.absorb_all(&evaluations)?;
        Ok(evaluations)
    }

    /// Folds an already computed window into the running state.
    pub fn absorb(&mut self, evaluation: &WindowEvaluation) -> Result<(), PickError> {
        self.absorb_all(std::slice::from_ref(evaluation))
    }

    /// Folds computed windows in order. Counters are checked for the whole
    /// batch before any residual is appended.
    pub fn absorb_all(&mut self, evaluations: &[WindowEvaluation]) -> Result<(), PickError> {
        let mut p = self.p;
        let mut s = self.s;
        for evaluation in evaluations {
            p.merge(&evaluation.p.outcome.stats)?;
            s.merge(&evaluation.s.outcome.stats)?;
        }
        let windows = self
            .windows
            .checked_add(evaluations.len())
            .ok_or_else(|| PickError::resource_limit("window counter overflow"))?;

        for (offset, evaluation) in evaluations.iter().enumerate() {
            for phase in Phase::ALL {
                self.residuals
                    .append(phase, &self.experiment, &evaluation.phase(phase).outcome);
            }
            tracing::debug!(
                window = self.windows + offset + 1,
                p_tp = evaluation.p.outcome.stats.true_positives,
                p_fp = evaluation.p.outcome.stats.false_positives,
                p_fn = evaluation.p.outcome.stats.false_negatives,
                s_tp = evaluation.s.outcome.stats.true_positives,
                s_fp = evaluation.s.outcome.stats.false_positives,
                s_fn = evaluation.s.outcome.stats.false_negatives,
                "window evaluated"
            );
        }

        self.p = p;
        self.s = s;
        self.windows = windows;
        Ok(())
    }

    pub fn report(&self) -> EvaluationReport {
        EvaluationReport {
            experiment: self.experiment.clone(),
            windows: self.windows,
            config: *self.config.as_config(),
            p: PhaseReport::new(Phase::P, self.p),
            s: PhaseReport::new(Phase::S, self.s),
        }
    }

    pub fn finish(self) -> (EvaluationReport, ResidualCollector) {
        let report = self.report();
        tracing::info!(
            label = %report.experiment.label,
            seed = report.experiment.seed,
            windows = report.windows,
            p_f1 = report.p.scores.f1,
            s_f1 = report.s.scores.f1,
            "evaluation finished"
        );
        (report, self.residuals)
    }
}

#[cfg(feature = "rayon")]
fn evaluate_all(
    windows: &[EvaluationWindow],
    config: &ValidatedEvalConfig,
) -> Result<Vec<WindowEvaluation>, PickError> {
    windows
        .par_iter()
        .map(|window| evaluate_window(window, config))
        .collect()
}

#[cfg(not(feature = "rayon"))]
fn evaluate_all(
    windows: &[EvaluationWindow],
    config: &ValidatedEvalConfig,
) -> Result<Vec<WindowEvaluation>, PickError> {
    windows
        .iter()
        .map(|window| evaluate_window(window, config))
        .collect()
}
