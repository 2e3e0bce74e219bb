//! Agent-to-agent message envelope.
//!
//! Requests and responses share one JSON shape:
//!
//! ```json
//! {"type": "request", "payload": {"message": "..."}, "metadata": {"trace_id": "..."}}
//! ```

use crate::directory::domain::CapabilityTag;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Envelope discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Caller to agent.
    Request,
    /// Successful agent answer.
    Response,
    /// Agent-side failure.
    Error,
}

impl MessageKind {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Response => "response",
            Self::Error => "error",
        }
    }
}

/// Envelope exchanged with agents over every transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct A2aMessage {
    /// Message discriminator.
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Message body.
    pub payload: Map<String, Value>,
    /// Free-form metadata (trace id, agent name, status).
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl A2aMessage {
    /// Builds a request envelope for `call`.
    #[must_use]
    pub fn request(call: &AgentCall) -> Self {
        let mut payload = match &call.payload {
            Value::Object(map) => map.clone(),
            other => {
                let mut map = Map::new();
                map.insert("message".to_owned(), other.clone());
                map
            }
        };
        payload.insert(
            "capability".to_owned(),
            Value::String(call.capability.to_string()),
        );

        let mut metadata = Map::new();
        if let Some(trace_id) = &call.trace_id {
            metadata.insert("trace_id".to_owned(), Value::String(trace_id.clone()));
        }

        Self {
            kind: MessageKind::Request,
            payload,
            metadata,
        }
    }

    /// Builds a response envelope.
    #[must_use]
    pub fn response(payload: Map<String, Value>, metadata: Map<String, Value>) -> Self {
        Self {
            kind: MessageKind::Response,
            payload,
            metadata,
        }
    }

    /// Builds an error envelope carrying a human-readable reason.
    #[must_use]
    pub fn error(reason: impl Into<String>) -> Self {
        let mut payload = Map::new();
        payload.insert("text".to_owned(), Value::String(reason.into()));
        let mut metadata = Map::new();
        metadata.insert("status".to_owned(), Value::String("error".to_owned()));
        Self {
            kind: MessageKind::Error,
            payload,
            metadata,
        }
    }

    /// Returns the capability a request addresses, if present.
    #[must_use]
    pub fn capability(&self) -> Option<&str> {
        self.payload.get("capability").and_then(Value::as_str)
    }

    /// Returns every capability a request addresses, `capability` first.
    #[must_use]
    pub fn capabilities(&self) -> Vec<&str> {
        let listed: Vec<&str> = self
            .payload
            .get("capabilities")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        if listed.is_empty() {
            self.capability().into_iter().collect()
        } else {
            listed
        }
    }

    /// Returns the `message` field of a request payload, if present.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.payload.get("message").and_then(Value::as_str)
    }

    /// Returns the `text` field of the payload, if present.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.payload.get("text").and_then(Value::as_str)
    }
}

/// A request addressed to one agent capability.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentCall {
    /// Capability being invoked.
    pub capability: CapabilityTag,
    /// Request body; non-object values are wrapped under `message`.
    pub payload: Value,
    /// Correlates the call with the originating chat request.
    pub trace_id: Option<String>,
}

impl AgentCall {
    /// Creates a call carrying a natural-language `message`.
    #[must_use]
    pub fn message(capability: CapabilityTag, message: impl Into<String>) -> Self {
        let mut payload = Map::new();
        payload.insert("message".to_owned(), Value::String(message.into()));
        Self {
            capability,
            payload: Value::Object(payload),
            trace_id: None,
        }
    }

    /// Asks a single agent to serve several capabilities in one call.
    ///
    /// The list is sent as `payload.capabilities`; `capability` stays the
    /// first entry.
    #[must_use]
    pub fn serving_all(mut self, capabilities: &[CapabilityTag]) -> Self {
        if capabilities.len() > 1 {
            if let Value::Object(map) = &mut self.payload {
                map.insert(
                    "capabilities".to_owned(),
                    Value::Array(
                        capabilities
                            .iter()
                            .map(|tag| Value::String(tag.to_string()))
                            .collect(),
                    ),
                );
            }
        }
        self
    }

    /// Attaches a trace id.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }
}

/// Successful agent answer.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentReply {
    /// Response body.
    pub payload: Map<String, Value>,
    /// Response metadata.
    pub metadata: Map<String, Value>,
}

impl AgentReply {
    /// Returns the human-readable answer text, if the agent supplied one.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.payload.get("text").and_then(Value::as_str)
    }
}

/// Frame carried on a multiplexed stream, one JSON document per line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamFrame {
    /// Caller-assigned id echoed by the agent.
    pub correlation_id: u64,
    /// Envelope, kept untyped so each caller can validate its own reply.
    pub message: Value,
}
