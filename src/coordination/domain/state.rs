//! Session lifecycle states.

use super::ParseSessionStateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordination session state.
///
/// `Init → DirectoryLookup → Dispatch → AwaitResponses → Aggregate →
/// {Completed | Failed | TimedOut}`, with early failure allowed from
/// `DirectoryLookup` and `Dispatch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Created, nothing done yet.
    Init,
    /// Selecting agents through the directory.
    DirectoryLookup,
    /// Sending requests.
    Dispatch,
    /// Collecting responses until every slot resolves or the deadline.
    AwaitResponses,
    /// Combining collected responses.
    Aggregate,
    /// At least one usable response was aggregated.
    Completed,
    /// Nothing usable could be produced.
    Failed,
    /// The deadline passed with no response.
    TimedOut,
}

impl SessionState {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::DirectoryLookup => "directory_lookup",
            Self::Dispatch => "dispatch",
            Self::AwaitResponses => "await_responses",
            Self::Aggregate => "aggregate",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
        }
    }

    /// Returns whether the state is final.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::TimedOut)
    }

    /// Returns whether `self → next` is a lifecycle edge.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Init, Self::DirectoryLookup)
                | (Self::DirectoryLookup | Self::Dispatch, Self::Failed)
                | (Self::DirectoryLookup, Self::Dispatch)
                | (Self::Dispatch, Self::AwaitResponses)
                | (Self::AwaitResponses, Self::Aggregate)
                | (
                    Self::Aggregate,
                    Self::Completed | Self::Failed | Self::TimedOut
                )
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SessionState {
    type Error = ParseSessionStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "init" => Ok(Self::Init),
            "directory_lookup" => Ok(Self::DirectoryLookup),
            "dispatch" => Ok(Self::Dispatch),
            "await_responses" => Ok(Self::AwaitResponses),
            "aggregate" => Ok(Self::Aggregate),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "timed_out" => Ok(Self::TimedOut),
            _ => Err(ParseSessionStateError(value.to_owned())),
        }
    }
}
