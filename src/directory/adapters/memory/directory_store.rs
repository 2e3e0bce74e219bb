//! Thread-safe in-memory directory store.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::directory::{
    domain::{AgentId, AgentRecord},
    ports::{AgentRecordStore, DirectoryStoreError, DirectoryStoreResult, RecordMutation},
};

/// In-memory directory store keyed by agent id.
///
/// Every write runs under a single write lock, so per-record updates are
/// atomic and listings always observe whole records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectoryStore {
    records: Arc<RwLock<BTreeMap<AgentId, AgentRecord>>>,
}

impl InMemoryDirectoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> DirectoryStoreError {
    DirectoryStoreError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl AgentRecordStore for InMemoryDirectoryStore {
    async fn upsert(&self, incoming: AgentRecord) -> DirectoryStoreResult<AgentRecord> {
        let mut records = self.records.write().map_err(lock_error)?;

        let stored = match records.get_mut(incoming.id()) {
            Some(existing) => {
                existing.absorb_registration(incoming);
                existing.clone()
            }
            None => {
                records.insert(incoming.id().clone(), incoming.clone());
                incoming
            }
        };
        Ok(stored)
    }

    async fn apply(
        &self,
        id: &AgentId,
        mutation: RecordMutation<'_>,
    ) -> DirectoryStoreResult<AgentRecord> {
        let mut records = self.records.write().map_err(lock_error)?;
        let existing = records
            .get_mut(id)
            .ok_or_else(|| DirectoryStoreError::NotFound(id.clone()))?;

        let mut candidate = existing.clone();
        mutation(&mut candidate)?;
        *existing = candidate.clone();
        Ok(candidate)
    }

    async fn find_by_id(&self, id: &AgentId) -> DirectoryStoreResult<Option<AgentRecord>> {
        let records = self.records.read().map_err(lock_error)?;
        Ok(records.get(id).cloned())
    }

    async fn list_all(&self) -> DirectoryStoreResult<Vec<AgentRecord>> {
        let records = self.records.read().map_err(lock_error)?;
        Ok(records.values().cloned().collect())
    }

    async fn ping(&self) -> DirectoryStoreResult<()> {
        self.records.read().map(|_| ()).map_err(lock_error)
    }
}
