//! Error taxonomy exposed to chat clients.

use crate::completion::ports::CompletionError;
use crate::coordination::domain::{FailureCause, FailureKind};
use crate::coordination::services::CoordinationError;
use crate::planner::domain::PlanError;
use crate::planner::ports::TransitDataError;
use crate::routing::services::{DiscoveryError, RoutingError};
use crate::transport::ports::TransportError;
use thiserror::Error;

/// Result type for exchange operations.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// Every error a chat request can end with.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExchangeError {
    /// The addressed record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// No agent (or dependency) could serve the request.
    #[error("not available: {0}")]
    NotAvailable(String),

    /// The answer did not arrive in time.
    #[error("timed out: {0}")]
    Timeout(String),

    /// The deployment is misconfigured (inactive agents, closed gate).
    #[error("configuration error: {0}")]
    ConfigurationError(String),

    /// An agent answered outside the envelope schema.
    #[error("malformed agent answer: {0}")]
    Malformed(String),

    /// The planner exhausted its one-transfer search.
    #[error("no route found within search depth from {origin} to {destination}")]
    NoRouteFound {
        /// Origin stop id.
        origin: String,
        /// Destination stop id.
        destination: String,
    },

    /// A completion or transit data provider failed.
    #[error("external provider error: {0}")]
    ExternalProviderError(String),

    /// The agent answered with an error envelope.
    #[error("agent rejected the request: {0}")]
    AgentRejected(String),

    /// A coordination session produced nothing usable.
    #[error("coordination failed: {}", causes.join("; "))]
    Failed {
        /// One entry per failure cause.
        causes: Vec<String>,
    },
}

impl ExchangeError {
    /// Returns the stable error code used on the wire.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::NotAvailable(_) => "not_available",
            Self::Timeout(_) => "timeout",
            Self::ConfigurationError(_) => "configuration_error",
            Self::Malformed(_) => "malformed",
            Self::NoRouteFound { .. } => "no_route_found",
            Self::ExternalProviderError(_) => "external_provider_error",
            Self::AgentRejected(_) => "agent_rejected",
            Self::Failed { .. } => "failed",
        }
    }

    /// Maps the causes of a failed session.
    ///
    /// A single cause keeps its own category; several become
    /// [`ExchangeError::Failed`].
    #[must_use]
    pub fn from_causes(causes: &[FailureCause]) -> Self {
        match causes {
            [only] => Self::from(only),
            [] => Self::Failed { causes: Vec::new() },
            several => Self::Failed {
                causes: several.iter().map(ToString::to_string).collect(),
            },
        }
    }
}

impl From<&FailureCause> for ExchangeError {
    fn from(cause: &FailureCause) -> Self {
        let detail = cause.to_string();
        match cause.kind {
            FailureKind::ConfigurationError => Self::ConfigurationError(detail),
            FailureKind::NotAvailable => Self::NotAvailable(detail),
            FailureKind::Timeout => Self::Timeout(detail),
            FailureKind::Malformed => Self::Malformed(detail),
            FailureKind::AgentRejected => Self::AgentRejected(detail),
        }
    }
}

impl From<TransportError> for ExchangeError {
    fn from(err: TransportError) -> Self {
        let detail = err.to_string();
        match err {
            TransportError::NotAvailable { .. } => Self::NotAvailable(detail),
            TransportError::Timeout { .. } => Self::Timeout(detail),
            TransportError::Malformed { .. } => Self::Malformed(detail),
            TransportError::AgentRejected { .. } => Self::AgentRejected(detail),
        }
    }
}

impl From<DiscoveryError> for ExchangeError {
    fn from(err: DiscoveryError) -> Self {
        let detail = err.to_string();
        match err {
            DiscoveryError::NoActiveAgent { .. } => Self::ConfigurationError(detail),
            DiscoveryError::NoAgentRegistered { .. } | DiscoveryError::Directory(_) => {
                Self::NotAvailable(detail)
            }
        }
    }
}

impl From<RoutingError> for ExchangeError {
    fn from(err: RoutingError) -> Self {
        match err {
            RoutingError::Discovery(inner) => Self::from(inner),
            RoutingError::Transport { source, .. } => Self::from(source),
        }
    }
}

impl From<CoordinationError> for ExchangeError {
    fn from(err: CoordinationError) -> Self {
        Self::Failed {
            causes: vec![err.to_string()],
        }
    }
}

impl From<PlanError> for ExchangeError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::NoRouteFound {
                origin,
                destination,
            } => Self::NoRouteFound {
                origin: origin.to_string(),
                destination: destination.to_string(),
            },
        }
    }
}

impl From<CompletionError> for ExchangeError {
    fn from(err: CompletionError) -> Self {
        Self::ExternalProviderError(err.to_string())
    }
}

impl From<TransitDataError> for ExchangeError {
    fn from(err: TransitDataError) -> Self {
        Self::ExternalProviderError(err.to_string())
    }
}
