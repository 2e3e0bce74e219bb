//! Agent directory record aggregate root.

use super::{ActivationState, AgentEndpoint, AgentId, CapabilityTag, DirectoryDomainError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Directory record describing one capability agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    id: AgentId,
    display_name: String,
    endpoint: AgentEndpoint,
    capabilities: BTreeSet<CapabilityTag>,
    state: ActivationState,
    registered_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedAgentData {
    /// Stored agent identifier.
    pub id: AgentId,
    /// Stored display name.
    pub display_name: String,
    /// Stored endpoint.
    pub endpoint: AgentEndpoint,
    /// Stored capability tags.
    pub capabilities: BTreeSet<CapabilityTag>,
    /// Stored activation state.
    pub state: ActivationState,
    /// Stored registration timestamp.
    pub registered_at: DateTime<Utc>,
    /// Stored update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl AgentRecord {
    /// Creates a new record in the [`ActivationState::Registered`] state.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryDomainError::EmptyDisplayName`] when the display
    /// name is blank or [`DirectoryDomainError::MissingCapabilities`] when no
    /// capability tag is supplied.
    pub fn new(
        id: AgentId,
        raw_display_name: impl Into<String>,
        endpoint: AgentEndpoint,
        capabilities: impl IntoIterator<Item = CapabilityTag>,
        clock: &impl Clock,
    ) -> Result<Self, DirectoryDomainError> {
        let display_name = raw_display_name.into().trim().to_owned();
        if display_name.is_empty() {
            return Err(DirectoryDomainError::EmptyDisplayName);
        }

        let capability_set: BTreeSet<CapabilityTag> = capabilities.into_iter().collect();
        if capability_set.is_empty() {
            return Err(DirectoryDomainError::MissingCapabilities);
        }

        let timestamp = clock.utc();
        Ok(Self {
            id,
            display_name,
            endpoint,
            capabilities: capability_set,
            state: ActivationState::Registered,
            registered_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a record from storage.
    #[must_use]
    pub fn from_persisted(data: PersistedAgentData) -> Self {
        Self {
            id: data.id,
            display_name: data.display_name,
            endpoint: data.endpoint,
            capabilities: data.capabilities,
            state: data.state,
            registered_at: data.registered_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the agent identifier.
    #[must_use]
    pub const fn id(&self) -> &AgentId {
        &self.id
    }

    /// Returns the human-readable name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the endpoint address.
    #[must_use]
    pub const fn endpoint(&self) -> &AgentEndpoint {
        &self.endpoint
    }

    /// Returns the advertised capability tags.
    #[must_use]
    pub const fn capabilities(&self) -> &BTreeSet<CapabilityTag> {
        &self.capabilities
    }

    /// Returns the activation state.
    #[must_use]
    pub const fn state(&self) -> ActivationState {
        self.state
    }

    /// Returns the first registration timestamp.
    #[must_use]
    pub const fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether the agent advertises `capability`.
    #[must_use]
    pub fn serves(&self, capability: &CapabilityTag) -> bool {
        self.capabilities.contains(capability)
    }

    /// Returns whether the agent is eligible for dispatch.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.state.is_live()
    }

    /// Applies a re-registration of the same agent id.
    ///
    /// Non-identity fields are overwritten with the incoming values. The
    /// activation state is never promoted: `registered` and `active` are
    /// preserved, while a `deregistered` record returns to `registered` and
    /// has to be activated again. The original registration timestamp is
    /// kept.
    pub fn absorb_registration(&mut self, incoming: Self) {
        self.display_name = incoming.display_name;
        self.endpoint = incoming.endpoint;
        self.capabilities = incoming.capabilities;
        if self.state == ActivationState::Deregistered {
            self.state = ActivationState::Registered;
        }
        self.updated_at = incoming.updated_at;
    }

    /// Activates the agent.
    ///
    /// Activating an already active record is a no-op and returns `false`.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryDomainError::InvalidTransition`] when the record has
    /// been deregistered.
    pub fn activate(&mut self, clock: &impl Clock) -> Result<bool, DirectoryDomainError> {
        if self.state == ActivationState::Active {
            return Ok(false);
        }
        self.transition_to(ActivationState::Active)?;
        self.touch(clock);
        Ok(true)
    }

    /// Withdraws the agent from dispatch. Idempotent.
    pub fn deactivate(&mut self, clock: &impl Clock) {
        if self.state != ActivationState::Deregistered {
            self.state = ActivationState::Deregistered;
            self.touch(clock);
        }
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }

    fn transition_to(&mut self, target: ActivationState) -> Result<(), DirectoryDomainError> {
        if !self.state.can_transition_to(target) {
            return Err(DirectoryDomainError::InvalidTransition {
                from: self.state.as_str().to_owned(),
                to: target.as_str().to_owned(),
            });
        }

        self.state = target;
        Ok(())
    }
}
