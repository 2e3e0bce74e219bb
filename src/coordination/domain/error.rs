//! Coordination domain errors.

use super::{SessionId, SessionState};
use crate::directory::domain::AgentId;
use thiserror::Error;

/// Errors raised by the session aggregate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionDomainError {
    /// The requested state change is not part of the lifecycle.
    #[error("session {session} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Session identifier.
        session: SessionId,
        /// Current state.
        from: SessionState,
        /// Requested state.
        to: SessionState,
    },

    /// The session has no slot for this agent.
    #[error("session {session} did not dispatch to agent {agent}")]
    UnknownAgent {
        /// Session identifier.
        session: SessionId,
        /// Agent that answered.
        agent: AgentId,
    },

    /// The session is no longer collecting responses.
    #[error("session {session} is not awaiting responses (state {state})")]
    NotAwaiting {
        /// Session identifier.
        session: SessionId,
        /// Current state.
        state: SessionState,
    },
}

/// Error returned when parsing an unknown session state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown session state: {0}")]
pub struct ParseSessionStateError(pub String);
