//! Error types for agent directory domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing or mutating directory domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryDomainError {
    /// The agent identifier is empty after trimming.
    #[error("agent id must not be empty")]
    EmptyAgentId,

    /// The agent identifier contains characters outside `[a-z0-9_-]`.
    #[error(
        "agent id '{0}' contains invalid characters (only lowercase alphanumeric, '-' and '_' allowed)"
    )]
    InvalidAgentId(String),

    /// The agent identifier exceeds the 100-character limit.
    #[error("agent id exceeds 100 character limit: {0}")]
    AgentIdTooLong(String),

    /// A capability tag is empty after trimming.
    #[error("capability tag must not be empty")]
    EmptyCapabilityTag,

    /// A capability tag contains characters outside `[a-z0-9_-]`.
    #[error("capability tag '{0}' contains invalid characters")]
    InvalidCapabilityTag(String),

    /// The display name is empty after trimming.
    #[error("agent display name must not be empty")]
    EmptyDisplayName,

    /// A registration declared no capabilities.
    #[error("agent must declare at least one capability")]
    MissingCapabilities,

    /// The endpoint could not be parsed as a URL.
    #[error("invalid agent endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// Raw endpoint value.
        endpoint: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The endpoint scheme is not one of `http`, `https` or `tcp`.
    #[error("unsupported endpoint scheme '{0}' (expected http, https or tcp)")]
    UnsupportedEndpointScheme(String),

    /// Transitioning between two activation states is invalid.
    #[error("invalid activation transition: {from} -> {to}")]
    InvalidTransition {
        /// Current activation state.
        from: String,
        /// Requested target activation state.
        to: String,
    },
}

/// Error returned while parsing an activation state from its wire form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown activation state: {0}")]
pub struct ParseActivationStateError(pub String);
