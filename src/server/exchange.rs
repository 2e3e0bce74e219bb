//! Exchange HTTP surface.

use super::ApiError;
use crate::exchange::domain::{ChatReply, ExchangeHealth};
use crate::exchange::services::ExchangeCore;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use mockable::Clock;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

/// Body of `POST /chat`.
#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(alias = "message")]
    query: String,
}

/// Builds the exchange router over `core`.
pub fn exchange_router<C>(core: ExchangeCore<C>) -> Router
where
    C: Clock + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health::<C>))
        .route("/chat", post(chat::<C>))
        .route("/revalidate", post(revalidate::<C>))
        .layer(TraceLayer::new_for_http())
        .with_state(core)
}

async fn health<C>(State(core): State<ExchangeCore<C>>) -> Json<ExchangeHealth>
where
    C: Clock + Send + Sync,
{
    Json(core.health().await)
}

async fn chat<C>(
    State(core): State<ExchangeCore<C>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError>
where
    C: Clock + Send + Sync,
{
    if request.query.trim().is_empty() {
        return Err(ApiError::malformed("query must not be empty"));
    }
    Ok(Json(core.chat(&request.query).await?))
}

async fn revalidate<C>(State(core): State<ExchangeCore<C>>) -> Json<Value>
where
    C: Clock + Send + Sync,
{
    let gate = core.revalidate().await;
    Json(json!({ "coordinationGate": gate }))
}
