// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use thiserror::Error;

/// Errors surfaced by pick extraction, matching, and accumulation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PickError {
    /// The probability signal contains values peak search cannot handle.
    #[error("invalid signal: {0}")]
    InvalidSignal(String),
    /// A tunable is out of domain or a configuration document is malformed.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// A counter would overflow.
    #[error("resource limit exceeded: {0}")]
    ResourceLimit(String),
}

impl PickError {
    pub fn invalid_signal(msg: impl Into<String>) -> Self {
        Self::InvalidSignal(msg.into())
    }

    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub fn resource_limit(msg: impl Into<String>) -> Self {
        Self::ResourceLimit(msg.into())
    }

    /// Stable machine-readable code for structured error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidSignal(_) => "invalid_signal",
            Self::InvalidConfiguration(_) => "invalid_configuration",
            Self::ResourceLimit(_) => "resource_limit",
        }
    }
}
