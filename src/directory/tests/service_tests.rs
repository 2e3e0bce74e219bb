//! Unit tests for directory service orchestration.

use std::sync::Arc;

use crate::directory::{
    adapters::memory::InMemoryDirectoryStore,
    domain::{ActivationState, CapabilityTag, DirectoryDomainError},
    ports::{AgentDirectory, AgentFilter, DirectoryStoreError},
    services::{DirectoryService, DirectoryServiceError, RegisterAgentRequest},
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

type TestService = DirectoryService<InMemoryDirectoryStore, DefaultClock>;

#[fixture]
fn service() -> TestService {
    DirectoryService::new(
        Arc::new(InMemoryDirectoryStore::new()),
        Arc::new(DefaultClock),
    )
}

fn planner_request() -> RegisterAgentRequest {
    RegisterAgentRequest::new("planner-agent", "Planner Agent", "http://localhost:8002")
        .with_capabilities(["trip_planning"])
}

fn alerts_request() -> RegisterAgentRequest {
    RegisterAgentRequest::new("alerts-agent", "Alerts Agent", "http://localhost:8001")
        .with_capabilities(["service_alerts"])
}

fn tag(raw: &str) -> CapabilityTag {
    CapabilityTag::new(raw).expect("valid tag")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn register_then_activate_makes_agent_live(service: TestService) {
    service
        .register(planner_request())
        .await
        .expect("registration should succeed");
    service
        .activate("planner-agent")
        .await
        .expect("activation should succeed");

    let live = service
        .list(&AgentFilter::live(tag("trip_planning")))
        .await
        .expect("listing should succeed");

    assert_eq!(live.len(), 1);
    let first = live.first().expect("one entry");
    assert_eq!(first.id().as_str(), "planner-agent");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn registered_agent_is_invisible_to_live_listing(service: TestService) {
    service
        .register(planner_request())
        .await
        .expect("registration should succeed");

    let live = service
        .list(&AgentFilter::live(tag("trip_planning")))
        .await
        .expect("listing should succeed");
    let all = service
        .list(&AgentFilter::for_capability(tag("trip_planning")))
        .await
        .expect("listing should succeed");

    assert!(live.is_empty());
    assert_eq!(all.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn activate_unknown_agent_returns_not_found(service: TestService) {
    let result = service.activate("ghost-agent").await;

    assert!(matches!(
        result,
        Err(DirectoryServiceError::Store(DirectoryStoreError::NotFound(_)))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn re_registration_keeps_active_state_and_refreshes_endpoint(service: TestService) {
    service
        .register(planner_request())
        .await
        .expect("registration should succeed");
    service
        .activate("planner-agent")
        .await
        .expect("activation should succeed");

    let refreshed = service
        .register(
            RegisterAgentRequest::new("planner-agent", "Planner Agent", "http://planner:9000")
                .with_capabilities(["trip_planning"]),
        )
        .await
        .expect("re-registration should succeed");

    assert_eq!(refreshed.state(), ActivationState::Active);
    assert_eq!(refreshed.endpoint().as_str(), "http://planner:9000");
    let all = service
        .list(&AgentFilter::all())
        .await
        .expect("listing should succeed");
    assert_eq!(all.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deactivated_agent_is_excluded_until_reactivated(service: TestService) {
    service
        .register(planner_request())
        .await
        .expect("registration should succeed");
    service
        .activate("planner-agent")
        .await
        .expect("activation should succeed");
    service
        .deactivate("planner-agent")
        .await
        .expect("deactivation should succeed");

    let reactivation = service.activate("planner-agent").await;
    assert!(matches!(
        reactivation,
        Err(DirectoryServiceError::Store(DirectoryStoreError::Rejected(
            DirectoryDomainError::InvalidTransition { .. }
        )))
    ));

    let live = service
        .list(&AgentFilter::live(tag("trip_planning")))
        .await
        .expect("listing should succeed");
    assert!(live.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listing_is_ordered_by_agent_id(service: TestService) {
    service
        .register(planner_request())
        .await
        .expect("registration should succeed");
    service
        .register(alerts_request())
        .await
        .expect("registration should succeed");

    let all = service
        .list(&AgentFilter::all())
        .await
        .expect("listing should succeed");

    let ids: Vec<&str> = all.iter().map(|record| record.id().as_str()).collect();
    assert_eq!(ids, vec!["alerts-agent", "planner-agent"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_endpoint_is_rejected(service: TestService) {
    let result = service
        .register(
            RegisterAgentRequest::new("planner-agent", "Planner", "ftp://planner")
                .with_capabilities(["trip_planning"]),
        )
        .await;

    assert!(matches!(
        result,
        Err(DirectoryServiceError::Domain(
            DirectoryDomainError::UnsupportedEndpointScheme(_)
        ))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_activations_are_serialised(service: TestService) {
    service
        .register(planner_request())
        .await
        .expect("registration should succeed");

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let worker = service.clone();
            tokio::spawn(async move { worker.activate("planner-agent").await })
        })
        .collect();
    for handle in handles {
        handle
            .await
            .expect("task should join")
            .expect("activation should succeed");
    }

    let record = service
        .find_by_id("planner-agent")
        .await
        .expect("lookup should succeed")
        .expect("record should exist");
    assert_eq!(record.state(), ActivationState::Active);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn health_reports_ok_for_in_memory_store(service: TestService) {
    service.health().await.expect("health should succeed");
}
