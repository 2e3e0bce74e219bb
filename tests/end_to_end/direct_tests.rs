//! Exchange, directory and agent talking plain HTTP.

use super::helpers::{TRANSFER_TEXT, deploy, spawn};
use serde_json::{Value, json};
use transit_exchange::routing::domain::PathKind;
use transit_exchange::server::exchange_router;
use transit_exchange::transport::domain::TransportKind;

#[tokio::test(flavor = "multi_thread")]
async fn fast_query_is_planned_by_the_remote_agent() {
    let deployment = deploy(TransportKind::Direct).await;

    let reply = deployment
        .exchange
        .chat("How do I get from Alewife to Kenmore?")
        .await
        .expect("fast answer");

    assert_eq!(reply.path_used, PathKind::Fast);
    assert_eq!(reply.answer_text, TRANSFER_TEXT);
}

#[tokio::test(flavor = "multi_thread")]
async fn one_agent_serving_two_capabilities_answers_once() {
    let deployment = deploy(TransportKind::Direct).await;

    let reply = deployment
        .exchange
        .chat("any delays on the red line from alewife to kenmore?")
        .await
        .expect("coordinated answer");

    assert_eq!(reply.path_used, PathKind::Coordinated);
    assert!(reply.answer_text.starts_with(TRANSFER_TEXT), "{}", reply.answer_text);
    assert!(
        reply
            .answer_text
            .contains("Shuttle buses replace Red Line service"),
        "{}",
        reply.answer_text
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn directory_lists_the_activated_agent() {
    let deployment = deploy(TransportKind::Direct).await;

    let listing: Value = reqwest::get(format!(
        "{}/agents?live_only=true&capability=stop_info",
        deployment.directory_url
    ))
    .await
    .expect("directory reachable")
    .json()
    .await
    .expect("json listing");

    assert_eq!(listing["agents"][0]["id"], "transit-agent");
    assert_eq!(listing["agents"][0]["state"], "active");
}

#[tokio::test(flavor = "multi_thread")]
async fn chat_surface_serves_json_over_http() {
    let deployment = deploy(TransportKind::Direct).await;
    let shutdown = tokio_util::sync::CancellationToken::new();
    let addr = spawn(exchange_router(deployment.exchange.clone()), &shutdown).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/chat"))
        .json(&json!({ "query": "where is park street station?" }))
        .send()
        .await
        .expect("exchange reachable");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("json reply");
    shutdown.cancel();

    assert_eq!(body["pathUsed"], "fast");
    assert_eq!(
        body["answerText"],
        "Park Street (stop place-pktrm) is served by Green Line B, Red Line."
    );
}
