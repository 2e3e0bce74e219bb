//! Fast-path dispatch to a single capability agent.

use super::discovery::{AgentDiscovery, DiscoveryError};
use crate::directory::domain::{AgentId, CapabilityTag};
use crate::transport::domain::{AgentCall, AgentReply};
use crate::transport::ports::{TransportChannel, TransportError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors raised on the fast path.
#[derive(Debug, Clone, Error)]
pub enum RoutingError {
    /// No agent could be selected.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// The selected agent failed to answer.
    #[error("agent {agent} failed: {source}")]
    Transport {
        /// Agent that was invoked.
        agent: AgentId,
        /// Transport failure.
        #[source]
        source: TransportError,
    },
}

/// Answer from the agent that served a fast-path query.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedReply {
    /// Agent that answered.
    pub agent: AgentId,
    /// Agent answer.
    pub reply: AgentReply,
}

/// Looks up one active agent and invokes it once.
#[derive(Clone)]
pub struct CapabilityRouter {
    discovery: AgentDiscovery,
    channel: Arc<dyn TransportChannel>,
    timeout: Duration,
}

impl CapabilityRouter {
    /// Creates a router dispatching through `channel` with a per-call
    /// `timeout`.
    #[must_use]
    pub fn new(
        discovery: AgentDiscovery,
        channel: Arc<dyn TransportChannel>,
        timeout: Duration,
    ) -> Self {
        Self {
            discovery,
            channel,
            timeout,
        }
    }

    /// Sends `query` to the first active agent serving `capability`.
    ///
    /// There is no local retry.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::Discovery`] when no agent can be selected and
    /// [`RoutingError::Transport`] when the call fails.
    pub async fn dispatch(
        &self,
        capability: &CapabilityTag,
        query: &str,
        trace_id: &str,
    ) -> Result<RoutedReply, RoutingError> {
        let agent = self.discovery.live_agent(capability).await?;
        let call = AgentCall::message(capability.clone(), query).with_trace_id(trace_id);
        tracing::debug!(agent = %agent.id(), %capability, "fast-path dispatch");

        self.channel
            .invoke(agent.endpoint(), &call, self.timeout)
            .await
            .map(|reply| RoutedReply {
                agent: agent.id().clone(),
                reply,
            })
            .map_err(|source| RoutingError::Transport {
                agent: agent.id().clone(),
                source,
            })
    }
}
