//! Deterministic provider answering from a queue.

use crate::completion::domain::{CompletionOptions, CompletionPrompt};
use crate::completion::ports::{CompletionError, CompletionProvider, CompletionResult};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Default)]
struct Script {
    answers: VecDeque<CompletionResult<String>>,
    fallback: Option<CompletionResult<String>>,
    prompts: Vec<CompletionPrompt>,
}

/// Completion provider that replays canned answers.
///
/// Queued answers are consumed first; afterwards the repeating answer (if
/// any) is returned. Without either, calls fail as unavailable.
#[derive(Debug, Clone, Default)]
pub struct ScriptedCompletion {
    script: Arc<Mutex<Script>>,
    delay: Duration,
}

impl ScriptedCompletion {
    /// Creates a provider that always answers `text`.
    #[must_use]
    pub fn answering(text: impl Into<String>) -> Self {
        let provider = Self::default();
        provider.set_repeating(Ok(text.into()));
        provider
    }

    /// Creates a provider that always fails.
    #[must_use]
    pub fn failing() -> Self {
        let provider = Self::default();
        provider.set_repeating(Err(CompletionError::InvalidResponse(
            "scripted failure".to_owned(),
        )));
        provider
    }

    /// Delays every answer by `delay`.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queues a one-off answer.
    pub fn push(&self, answer: CompletionResult<String>) {
        if let Ok(mut script) = self.script.lock() {
            script.answers.push_back(answer);
        }
    }

    /// Returns the prompts received so far.
    #[must_use]
    pub fn prompts(&self) -> Vec<CompletionPrompt> {
        self.script
            .lock()
            .map(|script| script.prompts.clone())
            .unwrap_or_default()
    }

    fn set_repeating(&self, answer: CompletionResult<String>) {
        if let Ok(mut script) = self.script.lock() {
            script.fallback = Some(answer);
        }
    }

    fn next_answer(&self, prompt: &CompletionPrompt) -> CompletionResult<String> {
        let mut script = self
            .script
            .lock()
            .map_err(|_| CompletionError::InvalidResponse("script poisoned".to_owned()))?;
        script.prompts.push(prompt.clone());
        if let Some(answer) = script.answers.pop_front() {
            return answer;
        }
        script.fallback.clone().unwrap_or_else(|| {
            Err(CompletionError::InvalidResponse(
                "no scripted answer left".to_owned(),
            ))
        })
    }
}

#[async_trait]
impl CompletionProvider for ScriptedCompletion {
    async fn complete(
        &self,
        prompt: &CompletionPrompt,
        options: &CompletionOptions,
    ) -> CompletionResult<String> {
        let answer = self.next_answer(prompt);
        if self.delay >= options.timeout {
            tokio::time::sleep(options.timeout).await;
            return Err(CompletionError::Timeout(options.timeout));
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        answer
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}
