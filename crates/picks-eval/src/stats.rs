// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use picks_core::PickError;

/// Running TP/FP/FN counts for one phase of one experiment configuration.
///
/// `total` counts every reference pick seen, so `true_positives +
/// false_negatives == total` holds after any sequence of merges.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PickStats {
    pub total: usize,
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl PickStats {
    /// Adds a per-window delta into this accumulator.
    pub fn merge(&mut self, delta: &PickStats) -> Result<(), PickError> {
        let merged = PickStats {
            total: checked_add(self.total, delta.total, "total")?,
            true_positives: checked_add(self.true_positives, delta.true_positives, "TP")?,
            false_positives: checked_add(self.false_positives, delta.false_positives, "FP")?,
            false_negatives: checked_add(self.false_negatives, delta.false_negatives, "FN")?,
        };
        *self = merged;
        Ok(())
    }

    /// Number of candidate picks classified so far.
    pub fn detections(&self) -> usize {
        self.true_positives + self.false_positives
    }
}

fn checked_add(current: usize, delta: usize, name: &str) -> Result<usize, PickError> {
    current
        .checked_add(delta)
        .ok_or_else(|| PickError::resource_limit(format!("{name} counter overflow")))
}
