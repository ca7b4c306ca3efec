// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Converts a continuous phase-arrival probability signal into discrete
//! candidate picks.

pub mod peaks;
pub mod smoothing;
pub mod widths;

use picks_core::{ExtractConfig, PickError, validate_signal};

pub use peaks::{local_maxima, select_by_distance, select_by_height};
pub use smoothing::moving_average_3;
pub use widths::{PeakProminence, PeakWidth, peak_prominence, peak_width};

/// Fraction of the prominence below the peak at which widths are measured.
pub const WIDTH_REL_HEIGHT: f64 = 0.5;

/// A detected arrival candidate.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CandidatePick {
    /// Sample position of the peak.
    pub index: usize,
    /// Processed-signal value at `index`.
    pub amplitude: f64,
    pub prominence: f64,
    /// Full width at half prominence, in samples.
    pub width: f64,
    pub width_height: f64,
    pub left_ip: f64,
    pub right_ip: f64,
}

/// Output of [`extract_picks`].
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractedPicks {
    /// Candidates in signal order.
    pub picks: Vec<CandidatePick>,
    /// The signal peak search ran on (smoothed when requested).
    pub processed: Vec<f64>,
}

impl ExtractedPicks {
    pub fn len(&self) -> usize {
        self.picks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    pub fn indices(&self) -> Vec<usize> {
        self.picks.iter().map(|pick| pick.index).collect()
    }

    pub fn widths(&self) -> Vec<f64> {
        self.picks.iter().map(|pick| pick.width).collect()
    }

    pub fn amplitudes(&self) -> Vec<f64> {
        self.picks.iter().map(|pick| pick.amplitude).collect()
    }
}

/// Extracts candidate picks from a probability signal.
///
/// The signal is optionally smoothed, then every local maximum at or above
/// `config.threshold` is kept unless a higher maximum lies fewer than
/// `config.min_distance` samples away. Empty or peakless signals yield no
/// picks; non-finite samples are rejected.
pub fn extract_picks(signal: &[f64], config: &ExtractConfig) -> Result<ExtractedPicks, PickError> {
    config.validate()?;
    validate_signal(signal)?;

    let processed = if config.smooth {
        moving_average_3(signal)
    } else {
        signal.to_vec()
    };

    let maxima = local_maxima(&processed);
    let above_threshold = select_by_height(&maxima, &processed, config.threshold);
    let kept = select_by_distance(&above_threshold, &processed, config.min_distance);

    let picks = kept
        .into_iter()
        .map(|index| {
            let prominence = peak_prominence(&processed, index);
            let width = peak_width(&processed, index, &prominence, WIDTH_REL_HEIGHT);
            CandidatePick {
                index,
                amplitude: processed[index],
                prominence: prominence.prominence,
                width: width.width,
                width_height: width.width_height,
                left_ip: width.left_ip,
                right_ip: width.right_ip,
            }
        })
        .collect::<Vec<_>>();

    tracing::trace!(
        samples = signal.len(),
        local_maxima = maxima.len(),
        picks = picks.len(),
        "extracted candidate picks"
    );

    Ok(ExtractedPicks { picks, processed })
}
