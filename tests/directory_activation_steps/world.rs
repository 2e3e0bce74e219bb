//! Shared world state for directory activation scenarios.

use std::sync::Arc;
use std::time::Duration;

use mockable::DefaultClock;
use rstest::fixture;
use transit_exchange::directory::{
    adapters::memory::InMemoryDirectoryStore,
    domain::CapabilityTag,
    ports::AgentFilter,
    services::{DirectoryService, RegisterAgentRequest},
};
use transit_exchange::routing::services::{
    AgentDiscovery, CapabilityRouter, RoutedReply, RoutingError,
};
use transit_exchange::transport::adapters::InMemoryChannel;

/// Directory service type used by the world.
pub type TestDirectory = DirectoryService<InMemoryDirectoryStore, DefaultClock>;

/// Scenario world for activation behaviour tests.
pub struct DirectoryWorld {
    /// The directory under test.
    pub service: TestDirectory,
    /// Fast-path router reading the same directory.
    pub router: CapabilityRouter,
    /// Result of the last fast-path query.
    pub last_query: Option<Result<RoutedReply, RoutingError>>,
}

impl DirectoryWorld {
    /// Creates a world with an empty directory.
    #[must_use]
    pub fn new() -> Self {
        let service = DirectoryService::new(
            Arc::new(InMemoryDirectoryStore::new()),
            Arc::new(DefaultClock),
        );
        let router = CapabilityRouter::new(
            AgentDiscovery::new(Arc::new(service.clone())),
            Arc::new(InMemoryChannel::new()),
            Duration::from_millis(200),
        );
        Self {
            service,
            router,
            last_query: None,
        }
    }

    /// Returns the ids of live agents serving `capability`.
    pub fn live_ids(&self, capability: &str) -> Result<Vec<String>, eyre::Report> {
        let filter = AgentFilter {
            capability: Some(CapabilityTag::new(capability)?),
            live_only: true,
        };
        let records = run_async(self.service.list_matching(&filter))?;
        Ok(records
            .iter()
            .map(|record| record.id().as_str().to_owned())
            .collect())
    }
}

impl Default for DirectoryWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> DirectoryWorld {
    DirectoryWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Builds a registration for `id` serving one capability.
pub fn build_request(id: &str, capability: &str) -> RegisterAgentRequest {
    RegisterAgentRequest::new(id, id, format!("http://{id}:8000")).with_capabilities([capability])
}
