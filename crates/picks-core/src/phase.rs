// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::PickError;
use std::fmt;

/// Seismic phase type.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    /// Primary (compressional) arrival.
    P,
    /// Secondary (shear) arrival.
    S,
}

impl Phase {
    /// Both phases in reporting order.
    pub const ALL: [Phase; 2] = [Phase::P, Phase::S];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::P => "P",
            Self::S => "S",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, PickError> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "P" => Ok(Self::P),
            "S" => Ok(Self::S),
            _ => Err(PickError::invalid_configuration(format!(
                "invalid phase '{raw}'; expected one of: P, S"
            ))),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Phase;

    #[test]
    fn parse_accepts_either_case() {
        assert_eq!(Phase::parse("p").expect("p should parse"), Phase::P);
        assert_eq!(Phase::parse(" S ").expect("S should parse"), Phase::S);
    }

    #[test]
    fn parse_rejects_unknown_phase() {
        let err = Phase::parse("Pn").expect_err("Pn is not a phase");
        assert!(err.to_string().contains("invalid phase 'Pn'"));
    }

    #[test]
    fn all_lists_p_before_s() {
        assert_eq!(Phase::ALL, [Phase::P, Phase::S]);
        assert_eq!(Phase::P.to_string(), "P");
    }
}
