//! Storage port for directory records.

use crate::directory::domain::{AgentId, AgentRecord, DirectoryDomainError};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for directory store operations.
pub type DirectoryStoreResult<T> = Result<T, DirectoryStoreError>;

/// Mutation applied to a single record while the store holds its write lock.
pub type RecordMutation<'a> =
    &'a (dyn Fn(&mut AgentRecord) -> Result<(), DirectoryDomainError> + Send + Sync);

/// Directory record persistence contract.
///
/// Implementations must apply every per-record write atomically: concurrent
/// readers observe either the record before or after a write, never a
/// partially applied one.
#[async_trait]
pub trait AgentRecordStore: Send + Sync {
    /// Inserts a new record or merges a re-registration into the existing one.
    ///
    /// Returns the stored record after the merge.
    async fn upsert(&self, incoming: AgentRecord) -> DirectoryStoreResult<AgentRecord>;

    /// Applies `mutation` to the record with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryStoreError::NotFound`] when no record exists and
    /// [`DirectoryStoreError::Rejected`] when the mutation fails; in that case
    /// the stored record is left unchanged.
    async fn apply(
        &self,
        id: &AgentId,
        mutation: RecordMutation<'_>,
    ) -> DirectoryStoreResult<AgentRecord>;

    /// Finds a record by id.
    async fn find_by_id(&self, id: &AgentId) -> DirectoryStoreResult<Option<AgentRecord>>;

    /// Returns every record, ordered by agent id.
    async fn list_all(&self) -> DirectoryStoreResult<Vec<AgentRecord>>;

    /// Checks that the store is usable.
    async fn ping(&self) -> DirectoryStoreResult<()>;
}

/// Errors returned by directory store implementations.
#[derive(Debug, Clone, Error)]
pub enum DirectoryStoreError {
    /// The record was not found.
    #[error("agent not found: {0}")]
    NotFound(AgentId),

    /// The requested mutation violated a domain rule.
    #[error(transparent)]
    Rejected(#[from] DirectoryDomainError),

    /// Storage-layer failure.
    #[error("directory storage error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl DirectoryStoreError {
    /// Wraps a storage error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
