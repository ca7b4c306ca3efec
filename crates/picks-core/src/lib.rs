// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Shared types for evaluating seismic phase pickers: the error enum, phase
//! labels, validated evaluation configuration, and signal checks.

pub mod config;
pub mod error;
pub mod phase;
pub mod signal;

pub use config::{
    DEFAULT_DETECTION_THRESHOLD, DEFAULT_MIN_DISTANCE, DEFAULT_SAMPLING_RATE_HZ,
    DEFAULT_TOLERANCE, EvalConfig, ExtractConfig, MatchConfig, ValidatedEvalConfig,
};
pub use error::PickError;
pub use phase::Phase;
pub use signal::{samples_to_seconds, validate_signal};
