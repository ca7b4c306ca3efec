// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

/// Height of a peak above the higher of its two surrounding minima.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeakProminence {
    pub prominence: f64,
    pub left_base: usize,
    pub right_base: usize,
}

/// Horizontal extent of a peak evaluated at a fraction of its prominence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeakWidth {
    pub width: f64,
    /// Signal level at which the width was measured.
    pub width_height: f64,
    /// Interpolated left crossing position, in samples.
    pub left_ip: f64,
    /// Interpolated right crossing position, in samples.
    pub right_ip: f64,
}

/// Computes the prominence of the peak at `peak` over the whole signal.
///
/// Each side is scanned outward until a sample higher than the peak (or the
/// signal edge) is reached; the lowest sample passed on that side is the base.
pub fn peak_prominence(values: &[f64], peak: usize) -> PeakProminence {
    let peak_value = values[peak];

    let mut left_base = peak;
    let mut left_min = peak_value;
    let mut idx = peak;
    loop {
        if values[idx] > peak_value {
            break;
        }
        if values[idx] < left_min {
            left_min = values[idx];
            left_base = idx;
        }
        if idx == 0 {
            break;
        }
        idx -= 1;
    }

    let mut right_base = peak;
    let mut right_min = peak_value;
    let mut idx = peak;
    while idx < values.len() && values[idx] <= peak_value {
        if values[idx] < right_min {
            right_min = values[idx];
            right_base = idx;
        }
        idx += 1;
    }

    PeakProminence {
        prominence: peak_value - left_min.max(right_min),
        left_base,
        right_base,
    }
}

/// Measures the width of `peak` at `rel_height` of its prominence below the
/// peak, interpolating linearly between the samples straddling that level.
pub fn peak_width(
    values: &[f64],
    peak: usize,
    prominence: &PeakProminence,
    rel_height: f64,
) -> PeakWidth {
    let width_height = values[peak] - prominence.prominence * rel_height;

    let mut idx = peak;
    while prominence.left_base < idx && width_height < values[idx] {
        idx -= 1;
    }
    let mut left_ip = idx as f64;
    if values[idx] < width_height {
        left_ip += (width_height - values[idx]) / (values[idx + 1] - values[idx]);
    }

    let mut idx = peak;
    while idx < prominence.right_base && width_height < values[idx] {
        idx += 1;
    }
    let mut right_ip = idx as f64;
    if values[idx] < width_height {
        right_ip -= (width_height - values[idx]) / (values[idx - 1] - values[idx]);
    }

    PeakWidth {
        width: right_ip - left_ip,
        width_height,
        left_ip,
        right_ip,
    }
}

#[cfg(test)]
mod tests {
    use super::{peak_prominence, peak_width};

    fn assert_approx_eq(actual: f64, expected: f64) {
        let delta = (actual - expected).abs();
        assert!(
            delta <= 1e-12,
            "expected {expected}, got {actual} (delta={delta})"
        );
    }

    #[test]
    fn prominence_of_isolated_impulse_is_its_height() {
        let values = [0.0, 0.0, 1.0, 0.0, 0.0];
        let prominence = peak_prominence(&values, 2);
        assert_approx_eq(prominence.prominence, 1.0);
        assert_eq!(prominence.left_base, 1);
        assert_eq!(prominence.right_base, 3);
    }

    #[test]
    fn prominence_uses_higher_of_the_two_bases() {
        let values = [0.1, 0.8, 0.3, 0.6, 0.0];
        let prominence = peak_prominence(&values, 3);
        assert_approx_eq(prominence.prominence, 0.3);
        assert_eq!(prominence.left_base, 2);
        assert_eq!(prominence.right_base, 4);
    }

    #[test]
    fn prominence_stops_at_higher_neighbouring_peak() {
        let values = [0.0, 0.2, 0.9, 0.1, 0.5, 0.2, 0.3];
        let prominence = peak_prominence(&values, 4);
        assert_eq!(prominence.left_base, 3);
        assert_eq!(prominence.right_base, 5);
        assert_approx_eq(prominence.prominence, 0.3);
    }

    #[test]
    fn width_of_unit_impulse_is_one_sample() {
        let values = [0.0, 0.0, 1.0, 0.0, 0.0];
        let prominence = peak_prominence(&values, 2);
        let width = peak_width(&values, 2, &prominence, 0.5);
        assert_approx_eq(width.width_height, 0.5);
        assert_approx_eq(width.left_ip, 1.5);
        assert_approx_eq(width.right_ip, 2.5);
        assert_approx_eq(width.width, 1.0);
    }

    #[test]
    fn width_interpolates_on_triangular_peak() {
        let values = [0.0, 0.25, 0.5, 0.75, 1.0, 0.75, 0.5, 0.25, 0.0];
        let prominence = peak_prominence(&values, 4);
        assert_approx_eq(prominence.prominence, 1.0);
        let width = peak_width(&values, 4, &prominence, 0.5);
        assert_approx_eq(width.left_ip, 2.0);
        assert_approx_eq(width.right_ip, 6.0);
        assert_approx_eq(width.width, 4.0);
    }

    #[test]
    fn width_is_measured_against_prominence_not_absolute_height() {
        let values = [0.4, 0.4, 0.6, 1.0, 0.6, 0.4, 0.4];
        let prominence = peak_prominence(&values, 3);
        assert_approx_eq(prominence.prominence, 0.6);
        let width = peak_width(&values, 3, &prominence, 0.5);
        assert_approx_eq(width.width_height, 0.7);
        assert_approx_eq(width.left_ip, 2.25);
        assert_approx_eq(width.right_ip, 3.75);
        assert_approx_eq(width.width, 1.5);
    }
}
