//! Live-agent discovery shared by the fast and coordinated paths.

use crate::directory::domain::{AgentId, AgentRecord, CapabilityTag};
use crate::directory::ports::{AgentDirectory, AgentFilter, DirectoryLookupError};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while selecting agents for a capability.
#[derive(Debug, Clone, Error)]
pub enum DiscoveryError {
    /// Agents advertise the capability but none is active.
    #[error("agents for capability '{capability}' are registered but none is active")]
    NoActiveAgent {
        /// Capability without a live agent.
        capability: CapabilityTag,
    },

    /// No agent ever registered the capability.
    #[error("no agent is registered for capability '{capability}'")]
    NoAgentRegistered {
        /// Unknown capability.
        capability: CapabilityTag,
    },

    /// The directory lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryLookupError),
}

/// One agent chosen for one or more capabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Selected agent.
    pub agent: AgentRecord,
    /// Capabilities this agent was selected for, in plan order.
    pub capabilities: Vec<CapabilityTag>,
}

/// Agents selected for a multi-capability plan.
#[derive(Debug, Clone, Default)]
pub struct SelectedAgents {
    /// One entry per distinct agent, in plan order.
    pub assignments: Vec<Assignment>,
    /// Agent selected for the primary capability, if any.
    pub primary: Option<AgentId>,
    /// Capabilities no live agent could serve, with the reason.
    pub unserved: Vec<DiscoveryError>,
}

/// Resolves capabilities to active agents through the directory.
#[derive(Clone)]
pub struct AgentDiscovery {
    directory: Arc<dyn AgentDirectory>,
}

impl AgentDiscovery {
    /// Creates a discovery helper over `directory`.
    #[must_use]
    pub fn new(directory: Arc<dyn AgentDirectory>) -> Self {
        Self { directory }
    }

    /// Returns the underlying directory.
    #[must_use]
    pub fn directory(&self) -> &Arc<dyn AgentDirectory> {
        &self.directory
    }

    /// Returns the first active agent (by id) serving `capability`.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::NoActiveAgent`] when records exist but none
    /// is active, [`DiscoveryError::NoAgentRegistered`] when none exists and
    /// [`DiscoveryError::Directory`] when the directory fails.
    pub async fn live_agent(&self, capability: &CapabilityTag) -> Result<AgentRecord, DiscoveryError> {
        let live = self
            .directory
            .list(&AgentFilter::live(capability.clone()))
            .await?;
        if let Some(agent) = live.into_iter().next() {
            return Ok(agent);
        }

        let any = self
            .directory
            .list(&AgentFilter::for_capability(capability.clone()))
            .await?;
        if any.is_empty() {
            Err(DiscoveryError::NoAgentRegistered {
                capability: capability.clone(),
            })
        } else {
            Err(DiscoveryError::NoActiveAgent {
                capability: capability.clone(),
            })
        }
    }

    /// Selects one live agent per capability, dispatching each agent once.
    ///
    /// # Errors
    ///
    /// Fails only when no capability can be served: with
    /// [`DiscoveryError::NoActiveAgent`] if any capability has registered
    /// agents, otherwise with [`DiscoveryError::NoAgentRegistered`]. A
    /// directory failure is returned as is.
    pub async fn select<'a, I>(&self, capabilities: I) -> Result<SelectedAgents, DiscoveryError>
    where
        I: IntoIterator<Item = &'a CapabilityTag>,
    {
        let mut selected = SelectedAgents::default();
        let mut first = true;

        for capability in capabilities {
            match self.live_agent(capability).await {
                Ok(agent) => {
                    if first {
                        selected.primary = Some(agent.id().clone());
                    }
                    let mut known = false;
                    for existing in selected
                        .assignments
                        .iter_mut()
                        .filter(|assignment| assignment.agent.id() == agent.id())
                    {
                        existing.capabilities.push(capability.clone());
                        known = true;
                    }
                    if !known {
                        selected.assignments.push(Assignment {
                            agent,
                            capabilities: vec![capability.clone()],
                        });
                    }
                }
                Err(err @ DiscoveryError::Directory(_)) => return Err(err),
                Err(err) => selected.unserved.push(err),
            }
            first = false;
        }

        if selected.assignments.is_empty() {
            let configured = selected
                .unserved
                .iter()
                .find(|err| matches!(err, DiscoveryError::NoActiveAgent { .. }))
                .or_else(|| selected.unserved.first())
                .cloned();
            if let Some(err) = configured {
                return Err(err);
            }
        }
        Ok(selected)
    }
}
