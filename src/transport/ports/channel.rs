//! Request/response contract shared by every transport variant.

use crate::directory::domain::AgentEndpoint;
use crate::transport::domain::{A2aMessage, AgentCall, AgentReply, MessageKind};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Delivers one call to one agent and waits for its answer.
///
/// Implementations never retry. Callers decide whether a failure is fatal.
#[async_trait]
pub trait TransportChannel: Send + Sync {
    /// Invokes `call` on the agent at `endpoint`, giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NotAvailable`] when the agent cannot be
    /// reached, [`TransportError::Timeout`] when no answer arrives in time,
    /// [`TransportError::Malformed`] when the answer violates the envelope
    /// schema and [`TransportError::AgentRejected`] when the agent answers
    /// with an error envelope.
    async fn invoke(
        &self,
        endpoint: &AgentEndpoint,
        call: &AgentCall,
        timeout: Duration,
    ) -> TransportResult<AgentReply>;
}

/// Errors returned by transport adapters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The agent could not be reached.
    #[error("agent at {endpoint} is not available: {reason}")]
    NotAvailable {
        /// Target endpoint.
        endpoint: String,
        /// Failure description.
        reason: String,
    },

    /// No answer arrived before the timeout.
    #[error("agent at {endpoint} did not answer within {after:?}")]
    Timeout {
        /// Target endpoint.
        endpoint: String,
        /// Elapsed budget.
        after: Duration,
    },

    /// The answer did not follow the envelope schema.
    #[error("agent at {endpoint} sent a malformed answer: {reason}")]
    Malformed {
        /// Target endpoint.
        endpoint: String,
        /// Schema violation.
        reason: String,
    },

    /// The agent answered with an error envelope.
    #[error("agent at {endpoint} rejected the request: {reason}")]
    AgentRejected {
        /// Target endpoint.
        endpoint: String,
        /// Reason reported by the agent.
        reason: String,
    },
}

impl TransportError {
    /// Builds a [`TransportError::NotAvailable`].
    pub fn not_available(endpoint: &AgentEndpoint, reason: impl ToString) -> Self {
        Self::NotAvailable {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Builds a [`TransportError::Malformed`].
    pub fn malformed(endpoint: &AgentEndpoint, reason: impl ToString) -> Self {
        Self::Malformed {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Builds a [`TransportError::Timeout`].
    #[must_use]
    pub fn timeout(endpoint: &AgentEndpoint, after: Duration) -> Self {
        Self::Timeout {
            endpoint: endpoint.to_string(),
            after,
        }
    }
}

/// Validates a raw answer envelope and converts it into a reply.
///
/// # Errors
///
/// Returns [`TransportError::Malformed`] for schema violations and
/// [`TransportError::AgentRejected`] for error envelopes.
pub(crate) fn decode_reply(endpoint: &AgentEndpoint, raw: Value) -> TransportResult<AgentReply> {
    let message: A2aMessage =
        serde_json::from_value(raw).map_err(|err| TransportError::malformed(endpoint, err))?;
    match message.kind {
        MessageKind::Response => Ok(AgentReply {
            payload: message.payload,
            metadata: message.metadata,
        }),
        MessageKind::Error => Err(TransportError::AgentRejected {
            endpoint: endpoint.to_string(),
            reason: message
                .text()
                .unwrap_or("agent reported an error")
                .to_owned(),
        }),
        MessageKind::Request => Err(TransportError::malformed(
            endpoint,
            "expected a response envelope, got a request",
        )),
    }
}
