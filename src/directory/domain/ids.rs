//! Identifier types for the agent directory domain.

use super::DirectoryDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for an agent identifier.
const MAX_ID_LENGTH: usize = 100;

/// Validated, stable identifier an agent registers under.
///
/// Agents choose their own identifier (e.g. `planner-agent`) so that
/// re-registration after a restart upserts the existing record instead of
/// creating a new one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AgentId(String);

impl AgentId {
    /// Creates a validated agent identifier.
    ///
    /// The input is trimmed and lowercased. Only characters in `[a-z0-9_-]`
    /// are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryDomainError::EmptyAgentId`] when the value is empty
    /// after trimming, [`DirectoryDomainError::AgentIdTooLong`] when it exceeds
    /// 100 characters, or [`DirectoryDomainError::InvalidAgentId`] when it
    /// contains characters outside `[a-z0-9_-]`.
    pub fn new(value: impl Into<String>) -> Result<Self, DirectoryDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_lowercase();

        if normalized.is_empty() {
            return Err(DirectoryDomainError::EmptyAgentId);
        }

        if normalized.len() > MAX_ID_LENGTH {
            return Err(DirectoryDomainError::AgentIdTooLong(raw));
        }

        let is_valid = normalized
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');

        if !is_valid {
            return Err(DirectoryDomainError::InvalidAgentId(raw));
        }

        Ok(Self(normalized))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for AgentId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AgentId {
    type Error = DirectoryDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AgentId> for String {
    fn from(value: AgentId) -> Self {
        value.0
    }
}
