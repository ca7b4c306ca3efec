// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::PickError;

/// Default probability cutoff for candidate picks.
pub const DEFAULT_DETECTION_THRESHOLD: f64 = 0.2;
/// Default minimum separation between two accepted peaks, in samples.
pub const DEFAULT_MIN_DISTANCE: usize = 50;
/// Default matching tolerance, in samples.
pub const DEFAULT_TOLERANCE: usize = 25;
/// Default sampling rate of the evaluated windows.
pub const DEFAULT_SAMPLING_RATE_HZ: f64 = 100.0;

/// Peak extraction tunables.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExtractConfig {
    /// Minimum peak height, in (0, 1].
    pub threshold: f64,
    /// Minimum number of samples between two accepted peaks.
    pub min_distance: usize,
    /// Apply a 3-tap moving average before peak search.
    pub smooth: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_DETECTION_THRESHOLD,
            min_distance: DEFAULT_MIN_DISTANCE,
            smooth: true,
        }
    }
}

impl ExtractConfig {
    pub fn validate(&self) -> Result<(), PickError> {
        if !self.threshold.is_finite() || self.threshold <= 0.0 || self.threshold > 1.0 {
            return Err(PickError::invalid_configuration(format!(
                "threshold must be in (0, 1]; got {}",
                self.threshold
            )));
        }
        if self.min_distance == 0 {
            return Err(PickError::invalid_configuration(
                "min_distance must be >= 1; got 0",
            ));
        }
        Ok(())
    }
}

/// Pick matching tunables.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchConfig {
    /// Largest `|candidate - reference|` still counted as a match, in samples.
    pub tolerance: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl MatchConfig {
    pub fn validate(&self) -> Result<(), PickError> {
        if self.tolerance == 0 {
            return Err(PickError::invalid_configuration(
                "tolerance must be >= 1; got 0",
            ));
        }
        Ok(())
    }
}

/// Full configuration for one evaluation run.
///
/// JSON documents must name every field; unknown fields are rejected.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EvalConfig {
    pub extract: ExtractConfig,
    pub matching: MatchConfig,
    /// Used only to express residuals in seconds.
    pub sampling_rate_hz: f64,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            extract: ExtractConfig::default(),
            matching: MatchConfig::default(),
            sampling_rate_hz: DEFAULT_SAMPLING_RATE_HZ,
        }
    }
}

impl EvalConfig {
    /// Checks every tunable and returns a config the evaluator can trust.
    pub fn validate(self) -> Result<ValidatedEvalConfig, PickError> {
        self.extract.validate()?;
        self.matching.validate()?;
        if !self.sampling_rate_hz.is_finite() || self.sampling_rate_hz <= 0.0 {
            return Err(PickError::invalid_configuration(format!(
                "sampling_rate_hz must be finite and > 0; got {}",
                self.sampling_rate_hz
            )));
        }
        Ok(ValidatedEvalConfig { inner: self })
    }

    /// Parses and validates a JSON configuration document.
    #[cfg(feature = "serde")]
    pub fn from_json_str(raw: &str) -> Result<ValidatedEvalConfig, PickError> {
        let config: EvalConfig = serde_json::from_str(raw).map_err(|err| {
            PickError::invalid_configuration(format!("invalid config JSON: {err}"))
        })?;
        config.validate()
    }
}

/// An [`EvalConfig`] that passed [`EvalConfig::validate`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValidatedEvalConfig {
    inner: EvalConfig,
}

impl ValidatedEvalConfig {
    pub fn extract(&self) -> &ExtractConfig {
        &self.inner.extract
    }

    pub fn matching(&self) -> &MatchConfig {
        &self.inner.matching
    }

    pub fn sampling_rate_hz(&self) -> f64 {
        self.inner.sampling_rate_hz
    }

    pub fn as_config(&self) -> &EvalConfig {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::{EvalConfig, ExtractConfig, MatchConfig};

    #[test]
    fn defaults_match_documented_tunables() {
        let config = EvalConfig::default();
        assert_eq!(config.extract.threshold, 0.2);
        assert_eq!(config.extract.min_distance, 50);
        assert!(config.extract.smooth);
        assert_eq!(config.matching.tolerance, 25);
        assert_eq!(config.sampling_rate_hz, 100.0);

        let validated = config.validate().expect("defaults should validate");
        assert_eq!(validated.as_config(), &config);
    }

    #[test]
    fn threshold_must_be_in_unit_interval() {
        for threshold in [0.0, -0.1, 1.5, f64::NAN] {
            let config = ExtractConfig {
                threshold,
                ..ExtractConfig::default()
            };
            let err = config
                .validate()
                .expect_err("out-of-domain threshold should fail");
            assert!(err.to_string().contains("threshold must be in (0, 1]"));
        }

        let config = ExtractConfig {
            threshold: 1.0,
            ..ExtractConfig::default()
        };
        config.validate().expect("threshold of 1.0 is allowed");
    }

    #[test]
    fn zero_min_distance_and_tolerance_are_rejected() {
        let extract = ExtractConfig {
            min_distance: 0,
            ..ExtractConfig::default()
        };
        assert!(extract.validate().is_err());

        let matching = MatchConfig { tolerance: 0 };
        let err = matching.validate().expect_err("zero tolerance should fail");
        assert!(err.to_string().contains("tolerance must be >= 1"));
    }

    #[test]
    fn sampling_rate_must_be_positive() {
        let config = EvalConfig {
            sampling_rate_hz: 0.0,
            ..EvalConfig::default()
        };
        let err = config.validate().expect_err("zero rate should fail");
        assert!(err.to_string().contains("sampling_rate_hz"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_config_roundtrip_validates() {
        let raw = r#"{
            "extract": {"threshold": 0.5, "min_distance": 30, "smooth": false},
            "matching": {"tolerance": 10},
            "sampling_rate_hz": 50.0
        }"#;
        let validated = EvalConfig::from_json_str(raw).expect("config should parse");
        assert_eq!(validated.extract().threshold, 0.5);
        assert_eq!(validated.extract().min_distance, 30);
        assert!(!validated.extract().smooth);
        assert_eq!(validated.matching().tolerance, 10);
        assert_eq!(validated.sampling_rate_hz(), 50.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_config_rejects_unknown_and_missing_keys() {
        let unknown = r#"{
            "extract": {"threshold": 0.5, "min_distance": 30, "smooth": false, "wlen": 3},
            "matching": {"tolerance": 10},
            "sampling_rate_hz": 50.0
        }"#;
        let err = EvalConfig::from_json_str(unknown).expect_err("unknown key should fail");
        assert!(err.to_string().contains("unknown field"));

        let missing = r#"{
            "extract": {"threshold": 0.5, "min_distance": 30},
            "matching": {"tolerance": 10},
            "sampling_rate_hz": 50.0
        }"#;
        let err = EvalConfig::from_json_str(missing).expect_err("missing key should fail");
        assert!(err.to_string().contains("missing field"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_config_is_validated_after_parsing() {
        let raw = r#"{
            "extract": {"threshold": 0.5, "min_distance": 30, "smooth": true},
            "matching": {"tolerance": 0},
            "sampling_rate_hz": 100.0
        }"#;
        let err = EvalConfig::from_json_str(raw).expect_err("zero tolerance should fail");
        assert!(err.to_string().contains("tolerance must be >= 1"));
    }
}
