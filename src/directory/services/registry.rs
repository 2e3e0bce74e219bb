//! Service layer for agent registration and discovery.
//!
//! Provides [`DirectoryService`] which coordinates registration, activation,
//! deactivation and listing of capability agents.

use crate::directory::{
    domain::{AgentEndpoint, AgentId, AgentRecord, CapabilityTag, DirectoryDomainError},
    ports::{
        AgentDirectory, AgentFilter, AgentRecordStore, DirectoryLookupError,
        DirectoryLookupResult, DirectoryStoreError,
    },
};
use async_trait::async_trait;
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Request payload for registering an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterAgentRequest {
    /// Stable agent identifier.
    pub id: String,
    /// Human-readable name.
    pub display_name: String,
    /// Endpoint address.
    pub endpoint: String,
    /// Advertised capability tags.
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl RegisterAgentRequest {
    /// Creates a request without capabilities.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            endpoint: endpoint.into(),
            capabilities: Vec::new(),
        }
    }

    /// Sets the advertised capability tags.
    #[must_use]
    pub fn with_capabilities<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.capabilities = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Service-level errors for directory operations.
#[derive(Debug, Error)]
pub enum DirectoryServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] DirectoryDomainError),
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] DirectoryStoreError),
}

impl DirectoryServiceError {
    /// Returns whether the error reports an unknown agent id.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(DirectoryStoreError::NotFound(_)))
    }
}

/// Result type for directory service operations.
pub type DirectoryServiceResult<T> = Result<T, DirectoryServiceError>;

/// Registration and discovery service over an [`AgentRecordStore`].
pub struct DirectoryService<S, C>
where
    S: AgentRecordStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> Clone for DirectoryService<S, C>
where
    S: AgentRecordStore,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S, C> DirectoryService<S, C>
where
    S: AgentRecordStore,
    C: Clock + Send + Sync,
{
    /// Creates a new directory service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Registers an agent, or refreshes an existing registration with the
    /// same id.
    ///
    /// New records start in the `registered` state; re-registration never
    /// promotes a record to `active`.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryServiceError::Domain`] when validation fails or
    /// [`DirectoryServiceError::Store`] when the store rejects the write.
    pub async fn register(
        &self,
        request: RegisterAgentRequest,
    ) -> DirectoryServiceResult<AgentRecord> {
        let RegisterAgentRequest {
            id,
            display_name,
            endpoint,
            capabilities,
        } = request;

        let agent_id = AgentId::new(id)?;
        let agent_endpoint = AgentEndpoint::parse(endpoint)?;
        let tags = capabilities
            .into_iter()
            .map(CapabilityTag::new)
            .collect::<Result<Vec<_>, _>>()?;

        let record = AgentRecord::new(agent_id, display_name, agent_endpoint, tags, &*self.clock)?;
        let stored = self.store.upsert(record).await?;
        tracing::info!(agent_id = %stored.id(), state = %stored.state(), "agent registered");
        Ok(stored)
    }

    /// Activates an agent. Activating an active agent is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryServiceError::Store`] wrapping
    /// [`DirectoryStoreError::NotFound`] for unknown ids, or a rejected
    /// transition for deregistered agents.
    pub async fn activate(&self, id: &str) -> DirectoryServiceResult<AgentRecord> {
        let agent_id = AgentId::new(id)?;
        let clock = Arc::clone(&self.clock);
        let record = self
            .store
            .apply(&agent_id, &move |record: &mut AgentRecord| {
                record.activate(&*clock).map(|_| ())
            })
            .await?;
        tracing::info!(agent_id = %record.id(), "agent activated");
        Ok(record)
    }

    /// Deregisters an agent. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryServiceError::Store`] wrapping
    /// [`DirectoryStoreError::NotFound`] for unknown ids.
    pub async fn deactivate(&self, id: &str) -> DirectoryServiceResult<AgentRecord> {
        let agent_id = AgentId::new(id)?;
        let clock = Arc::clone(&self.clock);
        let record = self
            .store
            .apply(&agent_id, &move |record: &mut AgentRecord| {
                record.deactivate(&*clock);
                Ok(())
            })
            .await?;
        tracing::info!(agent_id = %record.id(), "agent deregistered");
        Ok(record)
    }

    /// Finds a record by raw id.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryServiceError`] when the id is invalid or the store
    /// fails.
    pub async fn find_by_id(&self, id: &str) -> DirectoryServiceResult<Option<AgentRecord>> {
        let agent_id = AgentId::new(id)?;
        Ok(self.store.find_by_id(&agent_id).await?)
    }

    /// Lists records matching `filter`, ordered by agent id.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryServiceError::Store`] when the store fails.
    pub async fn list_matching(
        &self,
        filter: &AgentFilter,
    ) -> DirectoryServiceResult<Vec<AgentRecord>> {
        let records = self.store.list_all().await?;
        Ok(records
            .into_iter()
            .filter(|record| filter.matches(record))
            .collect())
    }
}

fn to_lookup_error(err: DirectoryServiceError) -> DirectoryLookupError {
    match err {
        DirectoryServiceError::Store(DirectoryStoreError::Persistence(cause)) => {
            DirectoryLookupError::Unreachable(cause)
        }
        other => DirectoryLookupError::InvalidResponse(other.to_string()),
    }
}

#[async_trait]
impl<S, C> AgentDirectory for DirectoryService<S, C>
where
    S: AgentRecordStore,
    C: Clock + Send + Sync,
{
    async fn list(&self, filter: &AgentFilter) -> DirectoryLookupResult<Vec<AgentRecord>> {
        self.list_matching(filter).await.map_err(to_lookup_error)
    }

    async fn find(&self, id: &AgentId) -> DirectoryLookupResult<Option<AgentRecord>> {
        self.store
            .find_by_id(id)
            .await
            .map_err(|err| to_lookup_error(err.into()))
    }

    async fn health(&self) -> DirectoryLookupResult<()> {
        self.store
            .ping()
            .await
            .map_err(|err| to_lookup_error(err.into()))
    }
}
