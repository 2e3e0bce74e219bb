//! Exchange core tests over in-memory collaborators.

use std::sync::Arc;
use std::time::Duration;

use crate::coordination::services::CoordinationOrchestrator;
use crate::directory::{
    adapters::memory::InMemoryDirectoryStore,
    domain::AgentEndpoint,
    ports::{AgentDirectory, DirectoryLookupError, MockAgentDirectory},
    services::{DirectoryService, RegisterAgentRequest},
};
use crate::exchange::domain::{ExchangeError, GateState};
use crate::exchange::services::ExchangeCore;
use crate::routing::domain::PathKind;
use crate::routing::services::{AgentDiscovery, CapabilityRouter, QueryClassifier};
use crate::transport::adapters::{InMemoryChannel, ScriptedAnswer};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

const PLANNER: &str = "http://planner:8002";
const ALERTS: &str = "http://alerts:8001";
const COORDINATED_QUERY: &str = "from alewife to park street, any delays?";

struct Harness {
    directory: Arc<DirectoryService<InMemoryDirectoryStore, DefaultClock>>,
    channel: InMemoryChannel,
    core: ExchangeCore<DefaultClock>,
}

fn wire(directory: Arc<dyn AgentDirectory>, channel: &InMemoryChannel) -> ExchangeCore<DefaultClock> {
    let discovery = AgentDiscovery::new(Arc::clone(&directory));
    let router = CapabilityRouter::new(
        discovery.clone(),
        Arc::new(channel.clone()),
        Duration::from_millis(200),
    );
    let orchestrator = CoordinationOrchestrator::new(
        discovery,
        Arc::new(channel.clone()),
        Arc::new(DefaultClock),
        Duration::from_millis(300),
    );
    ExchangeCore::new(directory, QueryClassifier::heuristic_only(), router, orchestrator)
}

#[fixture]
fn harness() -> Harness {
    let directory = Arc::new(DirectoryService::new(
        Arc::new(InMemoryDirectoryStore::new()),
        Arc::new(DefaultClock),
    ));
    let channel = InMemoryChannel::new();
    let core = wire(directory.clone(), &channel);
    Harness {
        directory,
        channel,
        core,
    }
}

fn unreachable_directory() -> MockAgentDirectory {
    let mut directory = MockAgentDirectory::new();
    directory.expect_health().returning(|| {
        Err(DirectoryLookupError::InvalidResponse(
            "connection refused".to_owned(),
        ))
    });
    directory
}

async fn register_agents(harness: &Harness) {
    for (id, url, capability) in [
        ("planner", PLANNER, "trip_planning"),
        ("alerts", ALERTS, "service_alerts"),
    ] {
        harness
            .directory
            .register(RegisterAgentRequest::new(id, id, url).with_capabilities([capability]))
            .await
            .expect("registration");
        harness.directory.activate(id).await.expect("activation");
        harness.channel.script(
            &AgentEndpoint::parse(url).expect("endpoint"),
            ScriptedAnswer::text(format!("answer from {id}")),
        );
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn fast_query_is_served_by_one_agent(harness: Harness) {
    register_agents(&harness).await;

    let reply = harness.core.chat("from alewife to kenmore").await.expect("answer");

    assert_eq!(reply.path_used, PathKind::Fast);
    assert_eq!(reply.answer_text, "answer from planner");
    assert!(!reply.trace_id.is_empty());
    let calls = harness.channel.calls();
    assert_eq!(
        calls.first().and_then(|call| call.trace_id.as_deref()),
        Some(reply.trace_id.as_str())
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn coordinated_query_aggregates_after_validation(harness: Harness) {
    register_agents(&harness).await;
    assert_eq!(harness.core.initialize().await, GateState::Open);

    let reply = harness.core.chat(COORDINATED_QUERY).await.expect("answer");

    assert_eq!(reply.path_used, PathKind::Coordinated);
    assert_eq!(reply.answer_text, "answer from planner\n\nanswer from alerts");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn coordinated_query_before_validation_is_a_configuration_error(harness: Harness) {
    register_agents(&harness).await;

    let err = harness.core.chat(COORDINATED_QUERY).await.expect_err("gate not open");

    assert!(matches!(err, ExchangeError::ConfigurationError(_)));
    assert!(harness.channel.calls().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_validation_disables_coordination_but_not_fast_path() {
    let channel = InMemoryChannel::new();
    let mut directory = unreachable_directory();
    directory.expect_list().returning(|_| Ok(Vec::new()));
    let core = wire(Arc::new(directory), &channel);

    assert_eq!(core.initialize().await, GateState::Closed);
    assert_eq!(core.initialize().await, GateState::Closed);

    let coordinated = core.chat(COORDINATED_QUERY).await.expect_err("gate closed");
    assert!(matches!(coordinated, ExchangeError::ConfigurationError(_)));

    let fast = core.chat("from alewife to kenmore").await.expect_err("no agents");
    assert!(matches!(fast, ExchangeError::NotAvailable(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn revalidation_reopens_a_closed_gate() {
    let channel = InMemoryChannel::new();
    let mut directory = MockAgentDirectory::new();
    let mut checks = 0_u32;
    directory.expect_health().returning(move || {
        checks += 1;
        if checks == 1 {
            Err(DirectoryLookupError::InvalidResponse("down".to_owned()))
        } else {
            Ok(())
        }
    });
    let core = wire(Arc::new(directory), &channel);

    assert_eq!(core.initialize().await, GateState::Closed);
    assert_eq!(core.revalidate().await, GateState::Open);
    assert_eq!(core.revalidate().await, GateState::Open);
    assert_eq!(core.gate_state(), GateState::Open);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn silent_agents_time_out_coordinated_queries(harness: Harness) {
    register_agents(&harness).await;
    for url in [PLANNER, ALERTS] {
        harness.channel.script(
            &AgentEndpoint::parse(url).expect("endpoint"),
            ScriptedAnswer::text("late").after(Duration::from_secs(5)),
        );
    }
    harness.core.initialize().await;

    let err = harness.core.chat(COORDINATED_QUERY).await.expect_err("deadline");

    assert!(matches!(err, ExchangeError::Timeout(_)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn health_reports_gate_and_directory(harness: Harness) {
    harness.core.initialize().await;

    let health = harness.core.health().await;

    assert!(health.directory_reachable);
    assert_eq!(health.coordination_gate, GateState::Open);
    assert_eq!(health.classifier_provider, None);
}
