//! Unit tests for discovery and fast-path dispatch.

use std::sync::Arc;
use std::time::Duration;

use crate::directory::{
    adapters::memory::InMemoryDirectoryStore,
    domain::{AgentEndpoint, CapabilityTag},
    ports::AgentDirectory,
    services::{DirectoryService, RegisterAgentRequest},
};
use crate::routing::services::{AgentDiscovery, CapabilityRouter, DiscoveryError, RoutingError};
use crate::transport::{
    adapters::{InMemoryChannel, ScriptedAnswer},
    ports::TransportError,
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

type TestDirectory = DirectoryService<InMemoryDirectoryStore, DefaultClock>;

struct Harness {
    directory: Arc<TestDirectory>,
    channel: InMemoryChannel,
    router: CapabilityRouter,
    discovery: AgentDiscovery,
}

#[fixture]
fn harness() -> Harness {
    let directory = Arc::new(DirectoryService::new(
        Arc::new(InMemoryDirectoryStore::new()),
        Arc::new(DefaultClock),
    ));
    let channel = InMemoryChannel::new();
    let lookup: Arc<dyn AgentDirectory> = directory.clone();
    let discovery = AgentDiscovery::new(lookup);
    let router = CapabilityRouter::new(
        discovery.clone(),
        Arc::new(channel.clone()),
        Duration::from_millis(200),
    );
    Harness {
        directory,
        channel,
        router,
        discovery,
    }
}

fn endpoint(raw: &str) -> AgentEndpoint {
    AgentEndpoint::parse(raw).expect("valid endpoint")
}

async fn register(harness: &Harness, id: &str, url: &str, capabilities: &[&str], active: bool) {
    harness
        .directory
        .register(RegisterAgentRequest::new(id, id, url).with_capabilities(capabilities.iter().copied()))
        .await
        .expect("registration");
    if active {
        harness.directory.activate(id).await.expect("activation");
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn active_agent_answers_fast_path(harness: Harness) {
    register(&harness, "planner", "http://planner:8002", &["trip_planning"], true).await;
    harness.channel.script(
        &endpoint("http://planner:8002"),
        ScriptedAnswer::text("Take the Red Line"),
    );

    let routed = harness
        .router
        .dispatch(&CapabilityTag::trip_planning(), "alewife to park", "trace-1")
        .await
        .expect("answer");

    assert_eq!(routed.agent.as_str(), "planner");
    assert_eq!(routed.reply.text(), Some("Take the Red Line"));
    let calls = harness.channel.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls.first().and_then(|call| call.trace_id.as_deref()), Some("trace-1"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn registered_but_inactive_agent_is_a_configuration_problem(harness: Harness) {
    register(&harness, "planner", "http://planner:8002", &["trip_planning"], false).await;

    let err = harness
        .router
        .dispatch(&CapabilityTag::trip_planning(), "alewife to park", "trace-2")
        .await
        .expect_err("no live agent");

    assert!(matches!(
        err,
        RoutingError::Discovery(DiscoveryError::NoActiveAgent { .. })
    ));
    assert!(harness.channel.calls().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_capability_is_not_available(harness: Harness) {
    register(&harness, "planner", "http://planner:8002", &["trip_planning"], true).await;

    let err = harness
        .router
        .dispatch(&CapabilityTag::service_alerts(), "red line delays", "trace-3")
        .await
        .expect_err("nobody serves alerts");

    assert!(matches!(
        err,
        RoutingError::Discovery(DiscoveryError::NoAgentRegistered { .. })
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn transport_failures_propagate_without_retry(harness: Harness) {
    register(&harness, "alerts", "http://alerts:8001", &["service_alerts"], true).await;
    harness.channel.script(
        &endpoint("http://alerts:8001"),
        ScriptedAnswer::failure(TransportError::Malformed {
            endpoint: "http://alerts:8001".to_owned(),
            reason: "missing payload".to_owned(),
        }),
    );

    let err = harness
        .router
        .dispatch(&CapabilityTag::service_alerts(), "red line delays", "trace-4")
        .await
        .expect_err("malformed");

    assert!(matches!(
        err,
        RoutingError::Transport {
            source: TransportError::Malformed { .. },
            ..
        }
    ));
    assert_eq!(harness.channel.calls().len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn selection_dispatches_multi_capability_agents_once(harness: Harness) {
    register(&harness, "everything", "http://all:8000", &["trip_planning", "stop_info"], true).await;
    register(&harness, "alerts", "http://alerts:8001", &["service_alerts"], true).await;
    let wanted = [
        CapabilityTag::trip_planning(),
        CapabilityTag::service_alerts(),
        CapabilityTag::stop_info(),
    ];

    let selected = harness.discovery.select(&wanted).await.expect("selection");

    assert_eq!(selected.assignments.len(), 2);
    assert_eq!(selected.primary.as_ref().map(|id| id.as_str()), Some("everything"));
    let everything = selected.assignments.first().expect("first assignment");
    assert_eq!(
        everything.capabilities,
        vec![CapabilityTag::trip_planning(), CapabilityTag::stop_info()]
    );
    assert!(selected.unserved.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn selection_prefers_configuration_error_over_missing_registration(harness: Harness) {
    register(&harness, "alerts", "http://alerts:8001", &["service_alerts"], false).await;
    let wanted = [CapabilityTag::trip_planning(), CapabilityTag::service_alerts()];

    let err = harness.discovery.select(&wanted).await.expect_err("nothing live");

    assert!(matches!(err, DiscoveryError::NoActiveAgent { capability } if capability == CapabilityTag::service_alerts()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn selection_with_no_records_is_not_available(harness: Harness) {
    let wanted = [CapabilityTag::stop_info()];

    let err = harness.discovery.select(&wanted).await.expect_err("empty directory");

    assert!(matches!(err, DiscoveryError::NoAgentRegistered { .. }));
}
