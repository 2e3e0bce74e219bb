//! Capability tag → handler registry.

use crate::agent::domain::{CapabilityRequest, HandlerReply, ReplyStatus};
use crate::agent::ports::CapabilityHandler;
use crate::directory::domain::CapabilityTag;
use crate::transport::domain::{A2aMessage, MessageKind};
use futures_util::future::try_join_all;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Routes request envelopes to the handler registered for each capability.
#[derive(Clone)]
pub struct HandlerRegistry {
    agent_name: String,
    handlers: BTreeMap<CapabilityTag, Arc<dyn CapabilityHandler>>,
}

impl HandlerRegistry {
    /// Creates an empty registry for the agent called `agent_name`.
    pub fn new(agent_name: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            handlers: BTreeMap::new(),
        }
    }

    /// Registers `handler`, replacing any handler for the same capability.
    #[must_use]
    pub fn with_handler(mut self, handler: Arc<dyn CapabilityHandler>) -> Self {
        self.handlers.insert(handler.capability(), handler);
        self
    }

    /// Returns the agent name reported in response metadata.
    #[must_use]
    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    /// Returns the served capabilities in tag order.
    pub fn capabilities(&self) -> impl Iterator<Item = &CapabilityTag> {
        self.handlers.keys()
    }

    /// Returns the handler for `capability`, if registered.
    #[must_use]
    pub fn handler(&self, capability: &str) -> Option<&Arc<dyn CapabilityHandler>> {
        CapabilityTag::new(capability)
            .ok()
            .and_then(|tag| self.handlers.get(&tag))
    }

    /// Decodes a raw envelope and answers it.
    pub async fn handle_value(&self, raw: Value) -> A2aMessage {
        match serde_json::from_value::<A2aMessage>(raw) {
            Ok(message) => self.handle(&message).await,
            Err(err) => {
                tracing::warn!(error = %err, "undecodable envelope");
                A2aMessage::error(format!("Malformed request: {err}"))
            }
        }
    }

    /// Answers a request envelope.
    ///
    /// A request listing several capabilities runs every handler and joins
    /// their texts in request order. Unknown capabilities and handler
    /// failures produce an error envelope.
    pub async fn handle(&self, message: &A2aMessage) -> A2aMessage {
        if message.kind != MessageKind::Request {
            return A2aMessage::error(format!(
                "Unsupported message type: {}",
                message.kind.as_str()
            ));
        }

        let tags = message.capabilities();
        if tags.is_empty() {
            return A2aMessage::error("The request does not name a capability.");
        }
        let mut handlers = Vec::with_capacity(tags.len());
        for tag in &tags {
            let Some(handler) = self.handler(tag) else {
                tracing::warn!(capability = %tag, agent = %self.agent_name, "capability not served");
                return A2aMessage::error(format!(
                    "Capability '{tag}' is not served by {}.",
                    self.agent_name
                ));
            };
            handlers.push(handler);
        }

        let trace_id = message
            .metadata
            .get("trace_id")
            .and_then(Value::as_str)
            .map(str::to_owned);
        let request = CapabilityRequest {
            message: message.message().unwrap_or_default().to_owned(),
            trace_id: trace_id.clone(),
        };
        tracing::info!(
            capabilities = ?tags,
            trace_id = trace_id.as_deref().unwrap_or_default(),
            "handling request"
        );

        match try_join_all(handlers.iter().map(|handler| handler.handle(&request))).await {
            Ok(replies) => self.respond(&replies, trace_id),
            Err(err) => {
                tracing::error!(error = %err, "handler failed");
                A2aMessage::error("An error occurred while processing your request.")
            }
        }
    }

    fn respond(&self, replies: &[HandlerReply], trace_id: Option<String>) -> A2aMessage {
        let (payload, status) = match replies {
            [single] => (single.payload(), single.status),
            several => {
                let text = several
                    .iter()
                    .map(|reply| reply.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n\n");
                let status = several
                    .iter()
                    .map(|reply| reply.status)
                    .reduce(ReplyStatus::merge)
                    .unwrap_or(ReplyStatus::Error);
                let mut payload = Map::new();
                payload.insert(
                    "ok".to_owned(),
                    Value::Bool(several.iter().all(|reply| reply.ok)),
                );
                payload.insert("text".to_owned(), Value::String(text));
                payload.insert(
                    "parts".to_owned(),
                    Value::Array(
                        several
                            .iter()
                            .map(|reply| Value::Object(reply.payload()))
                            .collect(),
                    ),
                );
                (payload, status)
            }
        };

        let mut metadata = Map::new();
        metadata.insert("status".to_owned(), Value::String(status.as_str().to_owned()));
        metadata.insert("agent".to_owned(), Value::String(self.agent_name.clone()));
        if let Some(id) = trace_id {
            metadata.insert("trace_id".to_owned(), Value::String(id));
        }
        A2aMessage::response(payload, metadata)
    }
}
