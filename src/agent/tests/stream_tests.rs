//! Multiplexed transport against the agent's stream listener.

use std::sync::Arc;
use std::time::Duration;

use crate::agent::{adapters::serve_stream, adapters::StopInfoHandler, services::HandlerRegistry};
use crate::directory::domain::{AgentEndpoint, CapabilityTag};
use crate::planner::{
    adapters::StaticTransitData,
    domain::{Route, RouteId, Stop, StopId},
};
use crate::transport::{
    adapters::MultiplexedStreamChannel,
    domain::AgentCall,
    ports::{TransportChannel, TransportError},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

async fn start_agent() -> (AgentEndpoint, CancellationToken) {
    let network = Arc::new(
        StaticTransitData::new()
            .with_stop(Stop::new(StopId::new("place-harsq").expect("id"), "Harvard"))
            .with_stop(Stop::new(StopId::new("place-kencl").expect("id"), "Kenmore"))
            .with_route(
                Route::new(RouteId::new("Red").expect("id"), "Red Line"),
                vec![StopId::new("place-harsq").expect("id")],
            ),
    );
    let registry = Arc::new(HandlerRegistry::new("stream-agent").with_handler(Arc::new(
        StopInfoHandler::new(network),
    )));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let shutdown = CancellationToken::new();
    tokio::spawn(serve_stream(listener, registry, shutdown.clone()));
    let endpoint = AgentEndpoint::parse(format!("tcp://{addr}")).expect("endpoint");
    (endpoint, shutdown)
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_calls_share_one_connection() {
    let (endpoint, shutdown) = start_agent().await;
    let channel = MultiplexedStreamChannel::new();
    let harvard = AgentCall::message(CapabilityTag::stop_info(), "harvard");
    let kenmore = AgentCall::message(CapabilityTag::stop_info(), "kenmore");

    let (first, second) = tokio::join!(
        channel.invoke(&endpoint, &harvard, Duration::from_secs(2)),
        channel.invoke(&endpoint, &kenmore, Duration::from_secs(2)),
    );

    assert_eq!(
        first.expect("harvard answer").text(),
        Some("Harvard (stop place-harsq) is served by Red Line.")
    );
    assert_eq!(
        second.expect("kenmore answer").text(),
        Some("Kenmore (stop place-kencl) has no scheduled routes.")
    );
    assert_eq!(channel.open_connections().await, 1);
    shutdown.cancel();
}

#[tokio::test(flavor = "multi_thread")]
async fn unserved_capability_is_rejected_over_the_stream() {
    let (endpoint, shutdown) = start_agent().await;
    let channel = MultiplexedStreamChannel::new();
    let call = AgentCall::message(CapabilityTag::trip_planning(), "harvard to kenmore");

    let err = channel
        .invoke(&endpoint, &call, Duration::from_secs(2))
        .await
        .expect_err("trip planning not served");

    assert!(matches!(err, TransportError::AgentRejected { .. }));
    shutdown.cancel();
}
