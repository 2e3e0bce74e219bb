//! Translation of service errors into HTTP responses.

use crate::directory::domain::DirectoryDomainError;
use crate::directory::ports::DirectoryStoreError;
use crate::directory::services::DirectoryServiceError;
use crate::exchange::domain::ExchangeError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Error answered by every HTTP surface as `{"error": {"code", "message"}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Creates an error with an explicit status and wire code.
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// A `404 not_found` error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    /// A `400 malformed` error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "malformed", message)
    }

    /// Returns the HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the wire code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": { "code": self.code, "message": self.message }
        }));
        (self.status, body).into_response()
    }
}

impl From<ExchangeError> for ApiError {
    fn from(err: ExchangeError) -> Self {
        let status = match &err {
            ExchangeError::NotFound(_) | ExchangeError::NoRouteFound { .. } => {
                StatusCode::NOT_FOUND
            }
            ExchangeError::NotAvailable(_) | ExchangeError::ConfigurationError(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ExchangeError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ExchangeError::Malformed(_)
            | ExchangeError::ExternalProviderError(_)
            | ExchangeError::AgentRejected(_)
            | ExchangeError::Failed { .. } => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, err.code(), err.to_string())
    }
}

impl From<DirectoryServiceError> for ApiError {
    fn from(err: DirectoryServiceError) -> Self {
        let (status, code) = match &err {
            DirectoryServiceError::Store(DirectoryStoreError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "not_found")
            }
            DirectoryServiceError::Store(DirectoryStoreError::Rejected(
                DirectoryDomainError::InvalidTransition { .. },
            )) => (StatusCode::CONFLICT, "invalid_transition"),
            DirectoryServiceError::Domain(_)
            | DirectoryServiceError::Store(DirectoryStoreError::Rejected(_)) => {
                (StatusCode::BAD_REQUEST, "malformed")
            }
            DirectoryServiceError::Store(DirectoryStoreError::Persistence(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "not_available")
            }
        };
        Self::new(status, code, err.to_string())
    }
}
