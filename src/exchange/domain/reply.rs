//! Chat surface payloads.

use super::GateState;
use crate::routing::domain::PathKind;
use serde::Serialize;

/// Answer to one chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    /// Rider-facing answer.
    pub answer_text: String,
    /// Path that produced the answer.
    pub path_used: PathKind,
    /// Wall-clock time spent serving the request.
    pub latency_ms: u64,
    /// Correlates logs and agent calls for this request.
    pub trace_id: String,
}

/// Exchange health report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeHealth {
    /// Whether the directory answered its health check now.
    pub directory_reachable: bool,
    /// Startup gate state.
    pub coordination_gate: GateState,
    /// Completion provider used by the classifier, if any.
    pub classifier_provider: Option<&'static str>,
}
