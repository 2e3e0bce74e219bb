//! Failure causes collected by a session.

use crate::directory::domain::AgentId;
use serde::Serialize;
use std::fmt;

/// Error category of a failure cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Agents exist but none is active.
    ConfigurationError,
    /// No agent, or the agent could not be reached.
    NotAvailable,
    /// No answer in time.
    Timeout,
    /// The answer violated the envelope schema.
    Malformed,
    /// The agent answered with an error envelope.
    AgentRejected,
}

impl FailureKind {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigurationError => "configuration_error",
            Self::NotAvailable => "not_available",
            Self::Timeout => "timeout",
            Self::Malformed => "malformed",
            Self::AgentRejected => "agent_rejected",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reason a session (or one of its slots) failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureCause {
    /// Agent concerned, when the failure is agent-specific.
    pub agent: Option<AgentId>,
    /// Category.
    pub kind: FailureKind,
    /// Human-readable detail.
    pub detail: String,
}

impl FailureCause {
    /// Creates a cause not tied to one agent.
    pub fn general(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            agent: None,
            kind,
            detail: detail.into(),
        }
    }

    /// Creates a cause for `agent`.
    pub fn for_agent(agent: AgentId, kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            agent: Some(agent),
            kind,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(agent) = &self.agent {
            write!(f, "{agent}: ")?;
        }
        write!(f, "{} ({})", self.detail, self.kind)
    }
}
