//! Scripted in-memory transport for tests and single-process wiring.

use crate::directory::domain::AgentEndpoint;
use crate::transport::domain::{AgentCall, AgentReply};
use crate::transport::ports::{TransportChannel, TransportError, TransportResult};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Canned outcome for one endpoint.
#[derive(Debug, Clone)]
pub struct ScriptedAnswer {
    delay: Duration,
    outcome: Result<Map<String, Value>, TransportError>,
}

impl ScriptedAnswer {
    /// Answers immediately with `{"text": text}`.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        let mut payload = Map::new();
        payload.insert("text".to_owned(), Value::String(text.into()));
        Self {
            delay: Duration::ZERO,
            outcome: Ok(payload),
        }
    }

    /// Fails immediately with `error`.
    #[must_use]
    pub const fn failure(error: TransportError) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Err(error),
        }
    }

    /// Waits `delay` before producing the outcome.
    #[must_use]
    pub const fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Debug, Default)]
struct ChannelState {
    answers: HashMap<String, ScriptedAnswer>,
    calls: Vec<(String, AgentCall)>,
}

/// Transport that answers from a per-endpoint script.
///
/// Endpoints without a script are reported as not available. Every call is
/// recorded, including calls that later time out.
#[derive(Debug, Clone, Default)]
pub struct InMemoryChannel {
    state: Arc<RwLock<ChannelState>>,
}

impl InMemoryChannel {
    /// Creates an empty channel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the answer returned for `endpoint`.
    pub fn script(&self, endpoint: &AgentEndpoint, answer: ScriptedAnswer) {
        if let Ok(mut state) = self.state.write() {
            state.answers.insert(endpoint.to_string(), answer);
        }
    }

    /// Returns the endpoints invoked so far, in call order.
    #[must_use]
    pub fn invoked_endpoints(&self) -> Vec<String> {
        self.state
            .read()
            .map(|state| state.calls.iter().map(|(endpoint, _)| endpoint.clone()).collect())
            .unwrap_or_default()
    }

    /// Returns the calls received so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<AgentCall> {
        self.state
            .read()
            .map(|state| state.calls.iter().map(|(_, call)| call.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TransportChannel for InMemoryChannel {
    async fn invoke(
        &self,
        endpoint: &AgentEndpoint,
        call: &AgentCall,
        timeout: Duration,
    ) -> TransportResult<AgentReply> {
        let answer = {
            let mut state = self
                .state
                .write()
                .map_err(|_| TransportError::not_available(endpoint, "channel state poisoned"))?;
            state.calls.push((endpoint.to_string(), call.clone()));
            state.answers.get(endpoint.as_str()).cloned()
        };

        let Some(answer) = answer else {
            return Err(TransportError::not_available(
                endpoint,
                "no agent scripted for endpoint",
            ));
        };

        if answer.delay >= timeout {
            tokio::time::sleep(timeout).await;
            return Err(TransportError::timeout(endpoint, timeout));
        }
        if !answer.delay.is_zero() {
            tokio::time::sleep(answer.delay).await;
        }

        answer.outcome.map(|payload| AgentReply {
            payload,
            metadata: Map::new(),
        })
    }
}
