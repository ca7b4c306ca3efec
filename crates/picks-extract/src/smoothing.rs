// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

const TAP_WEIGHT: f64 = 1.0 / 3.0;

/// Uniform 3-tap moving average with the output aligned to the input.
///
/// Samples outside the signal count as zero, so the first and last outputs
/// are attenuated rather than padded with repeated data.
pub fn moving_average_3(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    (0..n)
        .map(|idx| {
            let left = if idx > 0 { values[idx - 1] } else { 0.0 };
            let right = values.get(idx + 1).copied().unwrap_or(0.0);
            TAP_WEIGHT * left + TAP_WEIGHT * values[idx] + TAP_WEIGHT * right
        })
        .collect()
}
