//! Transit data provider contract.

use crate::planner::domain::{Alert, Route, RouteId, Stop, StopId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for transit data calls.
pub type TransitDataResult<T> = Result<T, TransitDataError>;

/// Read-only access to the raw transit network.
#[async_trait]
pub trait TransitDataProvider: Send + Sync {
    /// Returns the ordered stops of `route`.
    async fn stops(&self, route: &RouteId) -> TransitDataResult<Vec<Stop>>;

    /// Returns the routes calling at `stop`.
    async fn routes_at(&self, stop: &StopId) -> TransitDataResult<Vec<Route>>;

    /// Returns the active alerts for `route`.
    async fn alerts(&self, route: &RouteId) -> TransitDataResult<Vec<Alert>>;

    /// Finds the first stop whose name contains `name`, ignoring case.
    async fn find_stop(&self, name: &str) -> TransitDataResult<Option<Stop>>;

    /// Finds a route by id or by a case-insensitive name match.
    async fn find_route(&self, name: &str) -> TransitDataResult<Option<Route>>;

    /// Reports whether requests carry an API key.
    fn has_credentials(&self) -> bool {
        false
    }
}

/// Errors returned by transit data adapters.
#[derive(Debug, Clone, Error)]
pub enum TransitDataError {
    /// The provider could not be reached.
    #[error("transit data provider unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),

    /// The provider answered with an unexpected body or status.
    #[error("transit data provider returned an invalid response: {0}")]
    InvalidResponse(String),
}

impl TransitDataError {
    /// Wraps a transport failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
