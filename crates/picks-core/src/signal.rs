// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::PickError;

/// Rejects signals containing NaN or infinite samples.
///
/// Empty signals are valid and simply yield no picks downstream.
pub fn validate_signal(values: &[f64]) -> Result<(), PickError> {
    if let Some((index, value)) = values
        .iter()
        .copied()
        .enumerate()
        .find(|(_, value)| !value.is_finite())
    {
        return Err(PickError::invalid_signal(format!(
            "signal samples must be finite; signal[{index}]={value}"
        )));
    }
    Ok(())
}

/// Converts a sample offset to seconds.
pub fn samples_to_seconds(samples: f64, sampling_rate_hz: f64) -> f64 {
    samples / sampling_rate_hz
}

#[cfg(test)]
mod tests {
    use super::{samples_to_seconds, validate_signal};

    #[test]
    fn validate_signal_accepts_empty_and_finite_values() {
        validate_signal(&[]).expect("empty signal is valid");
        validate_signal(&[0.0, 0.5, 1.02]).expect("finite signal is valid");
    }

    #[test]
    fn validate_signal_reports_first_non_finite_index() {
        let err = validate_signal(&[0.1, f64::NAN, f64::INFINITY])
            .expect_err("NaN must be rejected");
        assert!(err.to_string().contains("signal[1]=NaN"));

        let err = validate_signal(&[0.1, f64::NEG_INFINITY])
            .expect_err("infinity must be rejected");
        assert!(err.to_string().contains("signal[1]=-inf"));
    }

    #[test]
    fn samples_convert_to_seconds() {
        assert!((samples_to_seconds(25.0, 100.0) - 0.25).abs() < 1e-12);
        assert!((samples_to_seconds(-3.0, 100.0) + 0.03).abs() < 1e-12);
    }
}
