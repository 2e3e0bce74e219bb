//! Terminal session outcomes.

use super::FailureCause;
use crate::directory::domain::{AgentId, CapabilityTag};
use crate::transport::domain::AgentReply;

/// One agent's usable answer.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentAnswer {
    /// Agent that answered.
    pub agent: AgentId,
    /// Capabilities the agent was asked to serve.
    pub capabilities: Vec<CapabilityTag>,
    /// Answer body.
    pub reply: AgentReply,
}

/// Responses combined into one result.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedAnswer {
    /// The primary agent's answer, when it arrived.
    pub primary: Option<AgentAnswer>,
    /// Secondary answers in agent-id order.
    pub secondaries: Vec<AgentAnswer>,
    /// Agents that did not answer usefully.
    pub missing: Vec<AgentId>,
    /// Causes recorded for missing agents and unserved capabilities.
    pub causes: Vec<FailureCause>,
}

impl AggregatedAnswer {
    /// Returns whether some dispatched agent or requested capability is
    /// missing from the result.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.missing.is_empty() || !self.causes.is_empty()
    }

    /// Returns whether the primary answer is missing and the result rests
    /// on secondaries only.
    #[must_use]
    pub const fn is_best_effort(&self) -> bool {
        self.primary.is_none()
    }
}

/// Final result of a session; exactly one per session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// At least one usable answer.
    Completed(AggregatedAnswer),
    /// Nothing usable; every cause is listed.
    Failed {
        /// Why the session failed.
        causes: Vec<FailureCause>,
    },
    /// No agent answered before the deadline.
    TimedOut {
        /// Agents still pending, or timed out, at the deadline.
        pending: Vec<AgentId>,
        /// Failures recorded before the deadline.
        causes: Vec<FailureCause>,
    },
}
