//! Classified queries.

use super::ExecutionPlan;
use crate::directory::domain::CapabilityTag;
use serde::Serialize;

/// Where a classification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSource {
    /// The completion capability answered.
    Model,
    /// The local keyword heuristic decided.
    Heuristic,
}

/// Classifier output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    /// Chosen plan.
    pub plan: ExecutionPlan,
    /// Decision source.
    pub source: ClassificationSource,
    /// Confidence in `0.0..=1.0`.
    pub confidence: f64,
}

/// A user query with its derived signals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    /// Raw text as typed.
    pub text: String,
    /// Derived intent: the primary capability.
    pub intent: CapabilityTag,
    /// Derived complexity: the number of capabilities involved.
    pub complexity: usize,
}

impl Query {
    /// Derives the query signals from a classification.
    #[must_use]
    pub fn classified(text: impl Into<String>, classification: &Classification) -> Self {
        Self {
            text: text.into(),
            intent: classification.plan.primary().clone(),
            complexity: classification.plan.capability_count(),
        }
    }
}
