//! Agent activation state.

use super::ParseActivationStateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Activation state of a directory record.
///
/// Activation is a mandatory, explicit transition: newly registered agents
/// are excluded from live listings until they are activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationState {
    /// The agent is known but not yet eligible for dispatch.
    Registered,
    /// The agent is live and eligible for dispatch.
    Active,
    /// The agent has been withdrawn.
    Deregistered,
}

impl ActivationState {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Active => "active",
            Self::Deregistered => "deregistered",
        }
    }

    /// Returns whether the state is eligible for dispatch.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns whether transition to `target` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Registered | Self::Active, Self::Active)
                | (_, Self::Deregistered)
                | (Self::Deregistered, Self::Registered)
        )
    }
}

impl fmt::Display for ActivationState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ActivationState {
    type Error = ParseActivationStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "registered" => Ok(Self::Registered),
            "active" => Ok(Self::Active),
            "deregistered" => Ok(Self::Deregistered),
            _ => Err(ParseActivationStateError(value.to_owned())),
        }
    }
}
