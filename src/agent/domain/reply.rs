//! Handler inputs and outputs.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Outcome category reported in `metadata.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyStatus {
    /// The request was answered.
    Success,
    /// More input is needed from the rider.
    Partial,
    /// The request could not be answered.
    Error,
}

impl ReplyStatus {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Error => "error",
        }
    }

    /// Combines the statuses of several handlers answering one call.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::Success, Self::Success) => Self::Success,
            (Self::Error, Self::Error) => Self::Error,
            _ => Self::Partial,
        }
    }
}

impl fmt::Display for ReplyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A capability request as seen by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityRequest {
    /// Rider text.
    pub message: String,
    /// Trace id of the originating chat request.
    pub trace_id: Option<String>,
}

impl CapabilityRequest {
    /// Creates a request for `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            trace_id: None,
        }
    }
}

/// A handler's answer.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerReply {
    /// Rider-facing text.
    pub text: String,
    /// Whether the request was understood and answered.
    pub ok: bool,
    /// Status reported in metadata.
    pub status: ReplyStatus,
    /// Structured details merged into the payload.
    pub details: Map<String, Value>,
}

impl HandlerReply {
    /// A successful answer.
    pub fn answered(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ok: true,
            status: ReplyStatus::Success,
            details: Map::new(),
        }
    }

    /// An answer asking the rider for more input.
    pub fn needs_input(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ok: false,
            status: ReplyStatus::Partial,
            details: Map::new(),
        }
    }

    /// An answer explaining why the request could not be served.
    pub fn unanswered(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ok: false,
            status: ReplyStatus::Error,
            details: Map::new(),
        }
    }

    /// Adds a structured detail.
    #[must_use]
    pub fn with_detail(mut self, key: &str, value: Value) -> Self {
        self.details.insert(key.to_owned(), value);
        self
    }

    /// Returns the response payload: details plus `ok` and `text`.
    #[must_use]
    pub fn payload(&self) -> Map<String, Value> {
        let mut payload = self.details.clone();
        payload.insert("ok".to_owned(), Value::Bool(self.ok));
        payload.insert("text".to_owned(), Value::String(self.text.clone()));
        payload
    }
}
