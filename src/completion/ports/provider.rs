//! Completion provider contract.

use crate::completion::domain::{CompletionOptions, CompletionPrompt};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for completion calls.
pub type CompletionResult<T> = Result<T, CompletionError>;

/// Produces text for a prompt.
///
/// Callers treat every error as recoverable and fall back to local logic.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Completes `prompt` within `options.timeout`.
    async fn complete(
        &self,
        prompt: &CompletionPrompt,
        options: &CompletionOptions,
    ) -> CompletionResult<String>;

    /// Returns the backend name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

/// Errors returned by completion adapters.
#[derive(Debug, Clone, Error)]
pub enum CompletionError {
    /// The provider could not be called.
    #[error("completion provider unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),

    /// The provider did not answer in time.
    #[error("completion timed out after {0:?}")]
    Timeout(Duration),

    /// The provider answered with an unexpected body or status.
    #[error("completion provider returned an invalid response: {0}")]
    InvalidResponse(String),
}

impl CompletionError {
    /// Wraps a transport failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
