//! Transport backend selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Transport backend used to reach agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// One HTTP request per call.
    #[default]
    Direct,
    /// Long-lived TCP stream per endpoint with correlated frames.
    Multiplexed,
}

impl TransportKind {
    /// Returns the canonical configuration value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Multiplexed => "multiplexed",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for unknown transport names.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown transport kind: {0} (expected direct or multiplexed)")]
pub struct ParseTransportKindError(pub String);

impl FromStr for TransportKind {
    type Err = ParseTransportKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "direct" | "http" => Ok(Self::Direct),
            "multiplexed" | "stream" => Ok(Self::Multiplexed),
            _ => Err(ParseTransportKindError(value.to_owned())),
        }
    }
}
