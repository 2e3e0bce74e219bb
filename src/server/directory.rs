//! Directory HTTP surface.

use super::ApiError;
use crate::directory::domain::{AgentRecord, CapabilityTag};
use crate::directory::ports::{AgentDirectory, AgentFilter, AgentRecordStore};
use crate::directory::services::{DirectoryService, DirectoryServiceError, RegisterAgentRequest};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

/// Query string accepted by `GET /agents`.
#[derive(Debug, Default, Deserialize)]
struct ListParams {
    capability: Option<String>,
    #[serde(default)]
    live_only: bool,
}

#[derive(Debug, Serialize)]
struct AgentListing {
    agents: Vec<AgentRecord>,
}

/// Builds the directory router over `service`.
pub fn directory_router<S, C>(service: DirectoryService<S, C>) -> Router
where
    S: AgentRecordStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health::<S, C>))
        .route("/agents", post(register::<S, C>).get(list::<S, C>))
        .route("/agents/{id}", get(find::<S, C>))
        .route("/agents/{id}/activate", post(activate::<S, C>))
        .route("/agents/{id}/deactivate", post(deactivate::<S, C>))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn health<S, C>(State(service): State<DirectoryService<S, C>>) -> Result<Json<Value>, ApiError>
where
    S: AgentRecordStore,
    C: Clock + Send + Sync,
{
    AgentDirectory::health(&service).await.map_err(|err| {
        ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "not_available", err.to_string())
    })?;
    Ok(Json(json!({ "status": "ok" })))
}

async fn register<S, C>(
    State(service): State<DirectoryService<S, C>>,
    Json(request): Json<RegisterAgentRequest>,
) -> Result<(StatusCode, Json<AgentRecord>), ApiError>
where
    S: AgentRecordStore,
    C: Clock + Send + Sync,
{
    let record = service.register(request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn activate<S, C>(
    State(service): State<DirectoryService<S, C>>,
    Path(id): Path<String>,
) -> Result<Json<AgentRecord>, ApiError>
where
    S: AgentRecordStore,
    C: Clock + Send + Sync,
{
    Ok(Json(service.activate(&id).await?))
}

async fn deactivate<S, C>(
    State(service): State<DirectoryService<S, C>>,
    Path(id): Path<String>,
) -> Result<Json<AgentRecord>, ApiError>
where
    S: AgentRecordStore,
    C: Clock + Send + Sync,
{
    Ok(Json(service.deactivate(&id).await?))
}

async fn find<S, C>(
    State(service): State<DirectoryService<S, C>>,
    Path(id): Path<String>,
) -> Result<Json<AgentRecord>, ApiError>
where
    S: AgentRecordStore,
    C: Clock + Send + Sync,
{
    service
        .find_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("agent not found: {id}")))
}

async fn list<S, C>(
    State(service): State<DirectoryService<S, C>>,
    Query(params): Query<ListParams>,
) -> Result<Json<AgentListing>, ApiError>
where
    S: AgentRecordStore,
    C: Clock + Send + Sync,
{
    let capability = params
        .capability
        .map(CapabilityTag::new)
        .transpose()
        .map_err(DirectoryServiceError::from)?;
    let filter = AgentFilter {
        capability,
        live_only: params.live_only,
    };
    let agents = service.list_matching(&filter).await?;
    Ok(Json(AgentListing { agents }))
}
