//! Read-side directory port used for discovery.

use crate::directory::domain::{AgentId, AgentRecord, CapabilityTag};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for directory lookups.
pub type DirectoryLookupResult<T> = Result<T, DirectoryLookupError>;

/// Listing filter for directory discovery.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AgentFilter {
    /// Only return agents advertising this capability.
    pub capability: Option<CapabilityTag>,
    /// Only return agents in the `active` state.
    pub live_only: bool,
}

impl AgentFilter {
    /// Matches every record.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            capability: None,
            live_only: false,
        }
    }

    /// Matches every record advertising `capability`, whatever its state.
    #[must_use]
    pub const fn for_capability(capability: CapabilityTag) -> Self {
        Self {
            capability: Some(capability),
            live_only: false,
        }
    }

    /// Matches active records advertising `capability`.
    #[must_use]
    pub const fn live(capability: CapabilityTag) -> Self {
        Self {
            capability: Some(capability),
            live_only: true,
        }
    }

    /// Returns whether `record` passes the filter.
    #[must_use]
    pub fn matches(&self, record: &AgentRecord) -> bool {
        let capability_ok = self
            .capability
            .as_ref()
            .is_none_or(|capability| record.serves(capability));
        capability_ok && (!self.live_only || record.is_live())
    }
}

/// Discovery contract over the agent directory.
///
/// Implemented in-process by the directory service and remotely by the HTTP
/// directory client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AgentDirectory: Send + Sync {
    /// Lists records matching `filter`, ordered by agent id.
    async fn list(&self, filter: &AgentFilter) -> DirectoryLookupResult<Vec<AgentRecord>>;

    /// Finds a record by id.
    async fn find(&self, id: &AgentId) -> DirectoryLookupResult<Option<AgentRecord>>;

    /// Confirms the directory is reachable.
    async fn health(&self) -> DirectoryLookupResult<()>;
}

/// Errors returned by directory lookups.
#[derive(Debug, Clone, Error)]
pub enum DirectoryLookupError {
    /// The directory could not be reached.
    #[error("agent directory unreachable: {0}")]
    Unreachable(Arc<dyn std::error::Error + Send + Sync>),

    /// The directory answered with something that is not a valid listing.
    #[error("invalid directory response: {0}")]
    InvalidResponse(String),
}

impl DirectoryLookupError {
    /// Wraps a connectivity error.
    pub fn unreachable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unreachable(Arc::new(err))
    }
}
