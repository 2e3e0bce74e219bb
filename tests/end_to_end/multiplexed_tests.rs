//! Exchange reaching the agent over its multiplexed stream listener.

use super::helpers::{TRANSFER_TEXT, deploy};
use transit_exchange::routing::domain::PathKind;
use transit_exchange::transport::domain::TransportKind;

#[tokio::test(flavor = "multi_thread")]
async fn fast_query_travels_over_the_stream() {
    let deployment = deploy(TransportKind::Multiplexed).await;

    let reply = deployment
        .exchange
        .chat("from alewife to kenmore")
        .await
        .expect("fast answer");

    assert_eq!(reply.path_used, PathKind::Fast);
    assert_eq!(reply.answer_text, TRANSFER_TEXT);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_chats_share_the_stream() {
    let deployment = deploy(TransportKind::Multiplexed).await;

    let (trip, stop) = tokio::join!(
        deployment.exchange.chat("from alewife to kenmore"),
        deployment.exchange.chat("which lines stop at kenmore station?"),
    );

    assert_eq!(trip.expect("trip answer").answer_text, TRANSFER_TEXT);
    assert_eq!(
        stop.expect("stop answer").answer_text,
        "Kenmore (stop place-kencl) is served by Green Line B."
    );
}
