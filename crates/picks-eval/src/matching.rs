// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::PickStats;
use picks_core::PickError;
use std::collections::HashSet;

/// One candidate paired with one reference pick.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PickMatch {
    pub candidate: usize,
    pub reference: usize,
    /// `candidate - reference`, in samples.
    pub residual: i64,
}

/// Immutable result of matching one window.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WindowOutcome {
    /// Counts contributed by this window alone.
    pub stats: PickStats,
    /// Matches in reference order.
    pub matches: Vec<PickMatch>,
    /// Candidates left unclaimed, in candidate order.
    pub unmatched_candidates: Vec<usize>,
    /// One residual per match, in reference order.
    pub tp_residuals: Vec<i64>,
    /// For every unclaimed candidate, one residual per reference pick in the
    /// window. These are a diagnostic spread, not candidate/reference pairs.
    pub fp_residuals: Vec<i64>,
}

/// Greedily pairs candidate picks with reference picks.
///
/// References are visited in their given order; each takes the first
/// unclaimed candidate (in candidate order) within `tolerance` samples, not
/// the closest one. Candidates are claimed by sample index, so a repeated
/// index that was already matched is neither matched again nor counted as a
/// false positive.
pub fn match_picks(
    candidates: &[usize],
    references: &[usize],
    tolerance: usize,
) -> Result<WindowOutcome, PickError> {
    if tolerance == 0 {
        return Err(PickError::invalid_configuration(
            "tolerance must be >= 1; got 0",
        ));
    }

    let mut claimed = HashSet::with_capacity(candidates.len().min(references.len()));
    let mut matches = Vec::with_capacity(references.len());
    let mut false_negatives = 0usize;

    for &reference in references {
        let found = candidates.iter().copied().find(|candidate| {
            !claimed.contains(candidate) && candidate.abs_diff(reference) <= tolerance
        });
        match found {
            Some(candidate) => {
                claimed.insert(candidate);
                matches.push(PickMatch {
                    candidate,
                    reference,
                    residual: signed_offset(candidate, reference)?,
                });
            }
            None => false_negatives += 1,
        }
    }

    let unmatched_candidates = candidates
        .iter()
        .copied()
        .filter(|candidate| !claimed.contains(candidate))
        .collect::<Vec<_>>();

    let mut fp_residuals = Vec::with_capacity(unmatched_candidates.len() * references.len());
    for &candidate in &unmatched_candidates {
        for &reference in references {
            fp_residuals.push(signed_offset(candidate, reference)?);
        }
    }

    let tp_residuals = matches.iter().map(|pick| pick.residual).collect();
    let stats = PickStats {
        total: references.len(),
        true_positives: matches.len(),
        false_positives: unmatched_candidates.len(),
        false_negatives,
    };

    Ok(WindowOutcome {
        stats,
        matches,
        unmatched_candidates,
        tp_residuals,
        fp_residuals,
    })
}

/// Matches one window and folds its counts into a running accumulator.
///
/// The accumulator is left unchanged when matching fails.
pub fn compare_picks(
    candidates: &[usize],
    references: &[usize],
    stats: &mut PickStats,
    tolerance: usize,
) -> Result<WindowOutcome, PickError> {
    let outcome = match_picks(candidates, references, tolerance)?;
    stats.merge(&outcome.stats)?;
    Ok(outcome)
}

fn signed_offset(candidate: usize, reference: usize) -> Result<i64, PickError> {
    let candidate = i64::try_from(candidate)
        .map_err(|_| PickError::resource_limit(format!("candidate index {candidate} exceeds i64")))?;
    let reference = i64::try_from(reference)
        .map_err(|_| PickError::resource_limit(format!("reference index {reference} exceeds i64")))?;
    Ok(candidate - reference)
}

#[cfg(test)]
mod tests {
    use super::{PickMatch, compare_picks, match_picks};
    use crate::PickStats;

    #[test]
    fn first_fit_takes_earliest_candidate_not_closest() {
        let outcome = match_picks(&[100, 105], &[90], 12).expect("matching should run");
        assert_eq!(
            outcome.matches,
            vec![PickMatch {
                candidate: 100,
                reference: 90,
                residual: 10,
            }]
        );
        assert_eq!(outcome.tp_residuals, vec![10]);
        assert_eq!(outcome.unmatched_candidates, vec![105]);
        assert_eq!(outcome.fp_residuals, vec![15]);
        assert_eq!(outcome.stats.true_positives, 1);
        assert_eq!(outcome.stats.false_positives, 1);
    }

    #[test]
    fn a_candidate_matches_at_most_one_reference() {
        let outcome = match_picks(&[100], &[95, 105], 10).expect("matching should run");
        assert_eq!(outcome.stats.true_positives, 1);
        assert_eq!(outcome.stats.false_negatives, 1);
        assert_eq!(outcome.stats.false_positives, 0);
        assert_eq!(outcome.matches[0].reference, 95);
        assert_eq!(outcome.tp_residuals, vec![5]);
        assert!(outcome.fp_residuals.is_empty());
    }

    #[test]
    fn reference_order_decides_who_claims_a_shared_candidate() {
        let outcome = match_picks(&[100], &[105, 95], 10).expect("matching should run");
        assert_eq!(outcome.matches[0].reference, 105);
        assert_eq!(outcome.tp_residuals, vec![-5]);
    }

    #[test]
    fn tolerance_bound_is_inclusive() {
        let outcome = match_picks(&[125, 176], &[100, 200], 25).expect("matching should run");
        assert_eq!(outcome.stats.true_positives, 2);
        assert_eq!(outcome.tp_residuals, vec![25, -24]);

        let outcome = match_picks(&[126], &[100], 25).expect("matching should run");
        assert_eq!(outcome.stats.true_positives, 0);
        assert_eq!(outcome.stats.false_negatives, 1);
    }

    #[test]
    fn unmatched_candidate_fans_out_over_every_reference() {
        let outcome =
            match_picks(&[10, 500, 1000, 2000], &[12, 1003, 1998], 25).expect("matching should run");
        assert_eq!(outcome.stats.true_positives, 3);
        assert_eq!(outcome.unmatched_candidates, vec![500]);
        assert_eq!(outcome.fp_residuals, vec![488, -503, -1498]);
    }

    #[test]
    fn empty_candidates_turn_every_reference_into_a_miss() {
        let outcome = match_picks(&[], &[10, 20, 30], 5).expect("matching should run");
        assert_eq!(
            outcome.stats,
            PickStats {
                total: 3,
                true_positives: 0,
                false_positives: 0,
                false_negatives: 3,
            }
        );
        assert!(outcome.fp_residuals.is_empty());
    }

    #[test]
    fn empty_references_turn_every_candidate_into_a_false_positive() {
        let outcome = match_picks(&[10, 20], &[], 5).expect("matching should run");
        assert_eq!(outcome.stats.total, 0);
        assert_eq!(outcome.stats.false_positives, 2);
        assert!(outcome.tp_residuals.is_empty());
        assert!(outcome.fp_residuals.is_empty());
    }

    #[test]
    fn both_empty_is_a_no_op() {
        let mut stats = PickStats::default();
        let outcome = compare_picks(&[], &[], &mut stats, 25).expect("matching should run");
        assert_eq!(stats, PickStats::default());
        assert_eq!(outcome, Default::default());
    }

    #[test]
    fn duplicate_candidate_of_a_matched_index_is_not_a_false_positive() {
        let outcome = match_picks(&[100, 100, 300], &[98], 5).expect("matching should run");
        assert_eq!(outcome.stats.true_positives, 1);
        assert_eq!(outcome.unmatched_candidates, vec![300]);
        assert_eq!(outcome.stats.false_positives, 1);
    }

    #[test]
    fn compare_picks_accumulates_across_windows() {
        let mut stats = PickStats::default();
        compare_picks(&[100], &[102], &mut stats, 25).expect("first window should match");
        compare_picks(&[400, 900], &[405], &mut stats, 25).expect("second window should match");
        compare_picks(&[], &[50], &mut stats, 25).expect("third window should match");
        assert_eq!(
            stats,
            PickStats {
                total: 3,
                true_positives: 2,
                false_positives: 1,
                false_negatives: 1,
            }
        );
        assert_eq!(stats.true_positives + stats.false_negatives, stats.total);
    }

    #[test]
    fn zero_tolerance_is_rejected_without_touching_stats() {
        let mut stats = PickStats::default();
        let err = compare_picks(&[1], &[1], &mut stats, 0).expect_err("zero tolerance fails");
        assert!(err.to_string().contains("tolerance must be >= 1"));
        assert_eq!(stats, PickStats::default());
    }
}
