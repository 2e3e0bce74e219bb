//! Capability agent HTTP surface.
//!
//! `POST /a2a/message` is the direct transport endpoint; `/plan` and
//! `/alerts` are read-only views over the same transit data. The tool
//! endpoints under `/mcp/tools` expose trip planning as a single callable
//! tool.

use super::ApiError;
use crate::agent::services::HandlerRegistry;
use crate::exchange::domain::ExchangeError;
use crate::planner::ports::TransitDataProvider;
use crate::planner::services::{TripPlanError, TripPlanner};
use crate::transport::domain::A2aMessage;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state of one agent process.
#[derive(Clone)]
pub struct AgentSurface {
    registry: Arc<HandlerRegistry>,
    planner: TripPlanner<dyn TransitDataProvider>,
    provider: Arc<dyn TransitDataProvider>,
}

impl AgentSurface {
    /// Bundles the handler registry with the planner and data provider used
    /// by the read-only endpoints.
    #[must_use]
    pub const fn new(
        registry: Arc<HandlerRegistry>,
        planner: TripPlanner<dyn TransitDataProvider>,
        provider: Arc<dyn TransitDataProvider>,
    ) -> Self {
        Self {
            registry,
            planner,
            provider,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PlanParams {
    origin: String,
    destination: String,
}

#[derive(Debug, Deserialize)]
struct AlertParams {
    route: String,
}

/// Name of the trip planning tool.
pub const PLAN_TRIP_TOOL: &str = "plan_mbta_trip";

#[derive(Debug, Deserialize)]
struct ToolCall {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: ToolArguments,
}

#[derive(Debug, Default, Deserialize)]
struct ToolArguments {
    origin: Option<String>,
    destination: Option<String>,
}

/// Builds the agent router.
pub fn agent_router(surface: AgentSurface) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/a2a/message", post(message))
        .route("/plan", get(plan))
        .route("/alerts", get(alerts))
        .route("/mcp/tools/list", post(list_tools))
        .route("/mcp/tools/call", post(call_tool))
        .layer(TraceLayer::new_for_http())
        .with_state(surface)
}

async fn health(State(surface): State<AgentSurface>) -> Json<Value> {
    let capabilities: Vec<&str> = surface
        .registry
        .capabilities()
        .map(|tag| tag.as_str())
        .collect();
    let llm_provider = surface.planner.extractor().provider_name();
    Json(json!({
        "status": "ok",
        "agent": surface.registry.agent_name(),
        "version": env!("CARGO_PKG_VERSION"),
        "capabilities": capabilities,
        "mbta_api_configured": surface.provider.has_credentials(),
        "llm_extraction_available": llm_provider.is_some(),
        "llm_provider": llm_provider,
    }))
}

async fn message(State(surface): State<AgentSurface>, body: Bytes) -> Json<A2aMessage> {
    // Undecodable bodies are answered with an error envelope.
    let raw = serde_json::from_slice::<Value>(&body).unwrap_or_default();
    Json(surface.registry.handle_value(raw).await)
}

async fn plan(
    State(surface): State<AgentSurface>,
    Query(params): Query<PlanParams>,
) -> Result<Json<Value>, ApiError> {
    let trip = surface
        .planner
        .plan(&params.origin, &params.destination)
        .await
        .map_err(trip_error)?;
    let candidate = trip.outcome.map_err(ExchangeError::from)?;
    Ok(Json(json!({
        "origin": trip.origin,
        "destination": trip.destination,
        "transfers": candidate.hops(),
        "itinerary": candidate,
        "text": trip.text,
    })))
}

async fn alerts(
    State(surface): State<AgentSurface>,
    Query(params): Query<AlertParams>,
) -> Result<Json<Value>, ApiError> {
    let route = surface
        .provider
        .find_route(&params.route)
        .await
        .map_err(ExchangeError::from)?
        .ok_or_else(|| ApiError::not_found(format!("no route matches '{}'", params.route)))?;
    let active = surface
        .provider
        .alerts(&route.id)
        .await
        .map_err(ExchangeError::from)?;
    Ok(Json(json!({ "route": route, "alerts": active })))
}

async fn list_tools() -> Json<Value> {
    Json(json!({
        "tools": [{
            "name": PLAN_TRIP_TOOL,
            "description": "Plan a trip between two MBTA stops, including transfers if needed.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "origin": {"type": "string", "description": "Origin stop name"},
                    "destination": {"type": "string", "description": "Destination stop name"},
                },
                "required": ["origin", "destination"],
            },
        }],
    }))
}

async fn call_tool(
    State(surface): State<AgentSurface>,
    Json(call): Json<ToolCall>,
) -> Json<Value> {
    let name = call.name.unwrap_or_default();
    if name != PLAN_TRIP_TOOL {
        return Json(json!({ "error": format!("Unknown tool: {name}") }));
    }

    let ToolArguments {
        origin,
        destination,
    } = call.arguments;
    let text = match (origin, destination) {
        (Some(from), Some(to)) => surface
            .planner
            .plan(&from, &to)
            .await
            .map_or_else(|err| err.user_text(), |trip| trip.text),
        _ => "Could not plan route: origin and destination are required.".to_owned(),
    };
    Json(json!({ "content": [{ "type": "text", "text": text }] }))
}

fn trip_error(err: TripPlanError) -> ApiError {
    match err {
        TripPlanError::UnknownStop(_) => ApiError::not_found(err.user_text()),
        TripPlanError::Provider(cause) => ExchangeError::from(cause).into(),
    }
}
