//! Spins up a directory, one capability agent and an exchange on loopback.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use mockable::DefaultClock;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use transit_exchange::agent::adapters::{
    ServiceAlertsHandler, StopInfoHandler, TripPlanningHandler, serve_stream,
};
use transit_exchange::agent::services::HandlerRegistry;
use transit_exchange::coordination::services::CoordinationOrchestrator;
use transit_exchange::directory::adapters::http::HttpDirectoryClient;
use transit_exchange::directory::adapters::memory::InMemoryDirectoryStore;
use transit_exchange::directory::domain::{AgentId, CapabilityTag};
use transit_exchange::directory::services::{DirectoryService, RegisterAgentRequest};
use transit_exchange::exchange::domain::GateState;
use transit_exchange::exchange::services::ExchangeCore;
use transit_exchange::planner::adapters::StaticTransitData;
use transit_exchange::planner::domain::{Alert, Route, RouteId, Stop, StopId};
use transit_exchange::planner::ports::TransitDataProvider;
use transit_exchange::planner::services::{LocationExtractor, TripPlanner};
use transit_exchange::routing::services::{AgentDiscovery, CapabilityRouter, QueryClassifier};
use transit_exchange::server::{AgentSurface, agent_router, directory_router, serve};
use transit_exchange::transport::adapters::build_channel;
use transit_exchange::transport::domain::TransportKind;

/// Fast-path answer for Alewife to Kenmore on the test network.
pub const TRANSFER_TEXT: &str =
    "Take the Red Line from Alewife to Park Street, then transfer to the Green Line B to Kenmore.";

/// Running processes for one test.
pub struct Deployment {
    /// Exchange core wired to the remote directory.
    pub exchange: ExchangeCore<DefaultClock>,
    /// Base URL of the directory surface.
    pub directory_url: String,
    shutdown: CancellationToken,
}

impl Drop for Deployment {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn stop_id(raw: &str) -> StopId {
    StopId::new(raw).expect("valid stop id")
}

fn route_id(raw: &str) -> RouteId {
    RouteId::new(raw).expect("valid route id")
}

/// Red Line to Park Street, Green Line B on to Kenmore.
pub fn network() -> Arc<dyn TransitDataProvider> {
    Arc::new(
        StaticTransitData::new()
            .with_stop(Stop::new(stop_id("place-alfcl"), "Alewife"))
            .with_stop(Stop::new(stop_id("place-harsq"), "Harvard"))
            .with_stop(Stop::new(stop_id("place-pktrm"), "Park Street"))
            .with_stop(Stop::new(stop_id("place-kencl"), "Kenmore"))
            .with_route(
                Route::new(route_id("Red"), "Red Line"),
                vec![
                    stop_id("place-alfcl"),
                    stop_id("place-harsq"),
                    stop_id("place-pktrm"),
                ],
            )
            .with_route(
                Route::new(route_id("Green-B"), "Green Line B"),
                vec![stop_id("place-pktrm"), stop_id("place-kencl")],
            )
            .with_alert(Alert {
                id: "a1".to_owned(),
                route: route_id("Red"),
                header: "Shuttle buses replace Red Line service".to_owned(),
                effect: Some("SHUTTLE".to_owned()),
            }),
    )
}

/// Serves `router` on an ephemeral loopback port.
pub async fn spawn(router: Router, shutdown: &CancellationToken) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(serve(listener, router, shutdown.clone()));
    addr
}

/// Starts every role and registers the agent under `kind`'s endpoint scheme.
pub async fn deploy(kind: TransportKind) -> Deployment {
    let shutdown = CancellationToken::new();

    let directory = DirectoryService::new(
        Arc::new(InMemoryDirectoryStore::new()),
        Arc::new(DefaultClock),
    );
    let directory_url = format!("http://{}", spawn(directory_router(directory), &shutdown).await);

    let provider = network();
    let planner = TripPlanner::new(Arc::clone(&provider), LocationExtractor::basic());
    let registry = Arc::new(
        HandlerRegistry::new("transit-agent")
            .with_handler(Arc::new(TripPlanningHandler::new(planner.clone())))
            .with_handler(Arc::new(ServiceAlertsHandler::new(Arc::clone(&provider))))
            .with_handler(Arc::new(StopInfoHandler::new(Arc::clone(&provider)))),
    );
    let http_addr = spawn(
        agent_router(AgentSurface::new(Arc::clone(&registry), planner, provider)),
        &shutdown,
    )
    .await;
    let endpoint = match kind {
        TransportKind::Direct => format!("http://{http_addr}"),
        TransportKind::Multiplexed => {
            let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stream");
            let addr = listener.local_addr().expect("stream addr");
            tokio::spawn(serve_stream(listener, registry, shutdown.clone()));
            format!("tcp://{addr}")
        }
    };

    let client = HttpDirectoryClient::new(directory_url.as_str()).expect("directory client");
    let request = RegisterAgentRequest::new("transit-agent", "Transit agent", endpoint)
        .with_capabilities(CapabilityTag::all_well_known().iter().map(CapabilityTag::as_str));
    client.register(&request).await.expect("registration");
    client
        .activate(&AgentId::new("transit-agent").expect("agent id"))
        .await
        .expect("activation");

    let lookup = Arc::new(client);
    let discovery = AgentDiscovery::new(Arc::clone(&lookup) as _);
    let channel = build_channel(kind);
    let router = CapabilityRouter::new(discovery.clone(), Arc::clone(&channel), Duration::from_secs(2));
    let orchestrator = CoordinationOrchestrator::new(
        discovery,
        channel,
        Arc::new(DefaultClock),
        Duration::from_secs(3),
    );
    let exchange = ExchangeCore::new(lookup, QueryClassifier::heuristic_only(), router, orchestrator);
    assert_eq!(exchange.initialize().await, GateState::Open);

    Deployment {
        exchange,
        directory_url,
        shutdown,
    }
}
