//! Query classification with a keyword-heuristic fallback.

use crate::completion::domain::{CompletionOptions, CompletionPrompt};
use crate::completion::ports::{CompletionError, CompletionProvider};
use crate::directory::domain::{CapabilityTag, well_known};
use crate::routing::domain::{Classification, ClassificationSource, ExecutionPlan, PathKind};
use minijinja::{Environment, context};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Confidence below which a model decision is treated as ambiguous.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.6;

const HEURISTIC_CONFIDENCE: f64 = 0.5;
const MAX_CLASSIFIER_TOKENS: u32 = 200;

const CLASSIFIER_SYSTEM: &str = "You route questions for a public transit assistant. \
Answer with a single JSON object and nothing else.";

const CLASSIFIER_TEMPLATE: &str = r#"Decide how to answer this transit question.

Question: "{{ query }}"

Capabilities:
{% for capability in capabilities -%}
- {{ capability }}
{% endfor %}
Use "fast" when exactly one capability can answer on its own, otherwise
"coordinated". List the capabilities needed, most important first, and give
your confidence between 0 and 1.

Answer format:
{"path": "fast" | "coordinated", "capabilities": ["..."], "confidence": 0.0}"#;

const TRIP_KEYWORDS: &[&str] = &[
    "from", "to", "get", "route", "directions", "trip", "travel", "take", "go", "going",
    "commute",
];
const ALERT_KEYWORDS: &[&str] = &[
    "alert", "alerts", "delay", "delays", "delayed", "disruption", "disruptions", "shuttle",
    "closed", "closure", "suspended", "status", "running", "late",
];
const STOP_KEYWORDS: &[&str] = &[
    "stop", "stops", "station", "stations", "accessible", "accessibility", "elevator",
    "elevators", "parking", "nearest", "where",
];

/// Tunables for [`QueryClassifier`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierSettings {
    /// Budget for the completion call.
    pub timeout: Duration,
    /// Minimum model confidence for a fast decision.
    pub confidence_threshold: f64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

/// Reasons a model answer is dropped in favour of the heuristic.
#[derive(Debug, Error)]
enum ClassifierFallback {
    #[error("prompt rendering failed: {0}")]
    Template(#[from] minijinja::Error),
    #[error("completion timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Provider(#[from] CompletionError),
    #[error("answer is not a classification: {0}")]
    Unparseable(String),
    #[error("unknown capability '{0}'")]
    UnknownCapability(String),
    #[error("answer names no capability")]
    NoCapability,
}

impl ClassifierFallback {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Template(_) => "template",
            Self::Timeout(_) => "timeout",
            Self::Provider(_) => "provider",
            Self::Unparseable(_) => "unparseable",
            Self::UnknownCapability(_) => "unknown_capability",
            Self::NoCapability => "no_capability",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ModelVerdict {
    path: PathKind,
    #[serde(default)]
    capabilities: Vec<String>,
    #[serde(default)]
    confidence: f64,
}

/// Maps raw query text to an [`ExecutionPlan`].
#[derive(Clone)]
pub struct QueryClassifier {
    completion: Option<Arc<dyn CompletionProvider>>,
    settings: ClassifierSettings,
    known: Vec<CapabilityTag>,
}

impl QueryClassifier {
    /// Creates a classifier that consults `completion` first.
    #[must_use]
    pub fn new(completion: Arc<dyn CompletionProvider>, settings: ClassifierSettings) -> Self {
        Self {
            completion: Some(completion),
            settings,
            known: CapabilityTag::all_well_known(),
        }
    }

    /// Creates a classifier that only uses the keyword heuristic.
    #[must_use]
    pub fn heuristic_only() -> Self {
        Self {
            completion: None,
            settings: ClassifierSettings::default(),
            known: CapabilityTag::all_well_known(),
        }
    }

    /// Returns the completion provider consulted first, if any.
    #[must_use]
    pub fn provider_name(&self) -> Option<&'static str> {
        self.completion
            .as_ref()
            .map(|completion| completion.provider_name())
    }

    /// Classifies `query`.
    ///
    /// Never fails: completion errors, timeouts and unusable answers fall
    /// back to the heuristic.
    pub async fn classify(&self, query: &str) -> Classification {
        let Some(completion) = &self.completion else {
            return self.heuristic(query);
        };

        match self.ask_model(completion.as_ref(), query).await {
            Ok(classification) => classification,
            Err(fallback) => {
                tracing::info!(
                    reason = fallback.kind(),
                    error = %fallback,
                    "classifier fell back to keyword heuristic"
                );
                self.heuristic(query)
            }
        }
    }

    async fn ask_model(
        &self,
        completion: &dyn CompletionProvider,
        query: &str,
    ) -> Result<Classification, ClassifierFallback> {
        let rendered = Environment::new().render_str(
            CLASSIFIER_TEMPLATE,
            context! { query => query, capabilities => &self.known },
        )?;
        let prompt = CompletionPrompt::user(rendered).with_system(CLASSIFIER_SYSTEM);
        let options = CompletionOptions::deterministic(MAX_CLASSIFIER_TOKENS, self.settings.timeout);

        let answer = tokio::time::timeout(self.settings.timeout, completion.complete(&prompt, &options))
            .await
            .map_err(|_| ClassifierFallback::Timeout(self.settings.timeout))??;

        self.interpret(&answer)
    }

    fn interpret(&self, answer: &str) -> Result<Classification, ClassifierFallback> {
        let json = answer
            .find('{')
            .zip(answer.rfind('}'))
            .and_then(|(start, end)| answer.get(start..=end))
            .ok_or_else(|| ClassifierFallback::Unparseable("no JSON object".to_owned()))?;
        let verdict: ModelVerdict = serde_json::from_str(json)
            .map_err(|err| ClassifierFallback::Unparseable(err.to_string()))?;

        let mut capabilities = Vec::with_capacity(verdict.capabilities.len());
        for raw in &verdict.capabilities {
            let tag = CapabilityTag::new(raw.as_str())
                .ok()
                .filter(|tag| self.known.contains(tag))
                .ok_or_else(|| ClassifierFallback::UnknownCapability(raw.clone()))?;
            if !capabilities.contains(&tag) {
                capabilities.push(tag);
            }
        }
        let mut tags = capabilities.into_iter();
        let primary = tags.next().ok_or(ClassifierFallback::NoCapability)?;
        let secondaries: Vec<CapabilityTag> = tags.collect();
        let confidence = verdict.confidence.clamp(0.0, 1.0);

        let confident = confidence >= self.settings.confidence_threshold;
        let plan = if verdict.path == PathKind::Fast && secondaries.is_empty() && confident {
            ExecutionPlan::fast(primary)
        } else {
            ExecutionPlan::coordinated(primary, secondaries)
        };

        Ok(Classification {
            plan,
            source: ClassificationSource::Model,
            confidence,
        })
    }

    /// Keyword classification: one matching capability is fast, anything
    /// else is coordinated.
    #[must_use]
    pub fn heuristic(&self, query: &str) -> Classification {
        let lowered = query.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .collect();

        let matched: Vec<CapabilityTag> = self
            .known
            .iter()
            .filter(|capability| {
                keywords_for(capability)
                    .iter()
                    .any(|keyword| words.contains(keyword))
            })
            .cloned()
            .collect();

        let plan = match matched.as_slice() {
            [only] => ExecutionPlan::fast(only.clone()),
            [] => coordinated_over(self.known.clone()),
            _ => coordinated_over(matched),
        };
        let confidence = if plan.kind() == PathKind::Fast {
            HEURISTIC_CONFIDENCE
        } else {
            0.0
        };

        Classification {
            plan,
            source: ClassificationSource::Heuristic,
            confidence,
        }
    }
}

fn keywords_for(capability: &CapabilityTag) -> &'static [&'static str] {
    match capability.as_str() {
        well_known::TRIP_PLANNING => TRIP_KEYWORDS,
        well_known::SERVICE_ALERTS => ALERT_KEYWORDS,
        well_known::STOP_INFO => STOP_KEYWORDS,
        _ => &[],
    }
}

/// Builds a coordinated plan with trip planning leading when present.
fn coordinated_over(mut capabilities: Vec<CapabilityTag>) -> ExecutionPlan {
    capabilities.sort_by_key(|capability| capability.as_str() != well_known::TRIP_PLANNING);
    let mut tags = capabilities.into_iter();
    match tags.next() {
        Some(primary) => ExecutionPlan::coordinated(primary, tags),
        None => ExecutionPlan::coordinated(CapabilityTag::trip_planning(), []),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("I think it is a trip question", "unparseable")]
    #[case(r#"{"path": "sideways", "capabilities": ["stop_info"]}"#, "unparseable")]
    #[case(r#"{"path": "fast", "capabilities": ["weather"], "confidence": 0.9}"#, "unknown_capability")]
    #[case(r#"{"path": "fast", "capabilities": ["Bad Tag!"], "confidence": 0.9}"#, "unknown_capability")]
    #[case(r#"{"path": "fast", "capabilities": [], "confidence": 0.9}"#, "no_capability")]
    fn unusable_answers_name_their_fallback_reason(#[case] answer: &str, #[case] kind: &str) {
        let classifier = QueryClassifier::heuristic_only();

        let fallback = classifier.interpret(answer).expect_err("unusable answer");

        assert_eq!(fallback.kind(), kind);
    }

    #[test]
    fn timeout_and_provider_failures_are_kept_apart() {
        let timeout = ClassifierFallback::Timeout(Duration::from_millis(5));
        let provider: ClassifierFallback =
            CompletionError::InvalidResponse("HTTP 500".to_owned()).into();

        assert_eq!(timeout.kind(), "timeout");
        assert_eq!(provider.kind(), "provider");
        assert!(provider.to_string().contains("HTTP 500"));
    }
}
