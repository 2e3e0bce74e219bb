//! Prompt and sampling options for one completion call.

use std::time::Duration;

/// System and user text sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletionPrompt {
    /// System instructions; empty when unused.
    pub system: String,
    /// User turn.
    pub user: String,
}

impl CompletionPrompt {
    /// Creates a prompt with only a user turn.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            system: String::new(),
            user: text.into(),
        }
    }

    /// Adds system instructions.
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = system.into();
        self
    }
}

/// Sampling limits for one completion call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    /// Maximum tokens the model may produce.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Wall-clock budget for the whole call.
    pub timeout: Duration,
}

impl CompletionOptions {
    /// Deterministic short-answer options used for extraction and
    /// classification prompts.
    #[must_use]
    pub const fn deterministic(max_tokens: u32, timeout: Duration) -> Self {
        Self {
            max_tokens,
            temperature: 0.0,
            timeout,
        }
    }
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            max_tokens: 500,
            temperature: 0.7,
            timeout: Duration::from_secs(10),
        }
    }
}
