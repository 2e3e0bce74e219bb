//! Capability handler contract.

use crate::agent::domain::{CapabilityRequest, HandlerReply};
use crate::directory::domain::CapabilityTag;
use crate::planner::ports::TransitDataError;
use async_trait::async_trait;
use thiserror::Error;

/// Result type for handler calls.
pub type HandlerResult<T> = Result<T, HandlerError>;

/// Serves one capability tag.
///
/// Rider mistakes (unknown stop, missing route) are answered with a
/// [`HandlerReply`]; only failures the rider cannot fix are errors.
#[async_trait]
pub trait CapabilityHandler: Send + Sync {
    /// Returns the capability this handler serves.
    fn capability(&self) -> CapabilityTag;

    /// Answers `request`.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] when a collaborator fails.
    async fn handle(&self, request: &CapabilityRequest) -> HandlerResult<HandlerReply>;
}

/// Errors raised by capability handlers.
#[derive(Debug, Clone, Error)]
pub enum HandlerError {
    /// The transit data provider failed.
    #[error(transparent)]
    TransitData(#[from] TransitDataError),
}
