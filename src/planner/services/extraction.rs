//! Origin/destination extraction from free text.

use crate::completion::domain::{CompletionOptions, CompletionPrompt};
use crate::completion::ports::CompletionProvider;
use minijinja::{Environment, context};
use std::sync::Arc;
use std::time::Duration;

const EXTRACTION_TEMPLATE: &str = r#"Extract the origin and destination locations from this transit query.

Query: "{{ query }}"

Instructions:
- Return ONLY the two location names separated by a pipe |
- Use the exact location names mentioned
- If only the destination is mentioned, use "none" for the origin
- If locations are unclear, use "none"
- Do not include words like "station" or "stop" unless part of the name

Format: origin|destination

Examples:
{% for example in examples -%}
- "{{ example[0] }}" -> {{ example[1] }}
{% endfor %}
Response:"#;

const EXAMPLES: [(&str, &str); 4] = [
    ("how do I get from park street to harvard", "park street|harvard"),
    (
        "i wanna go to park street from northeastern university",
        "northeastern university|park street",
    ),
    ("take me to harvard", "none|harvard"),
    ("northeastern to park street", "northeastern|park street"),
];

const FILLER_WORDS: [&str; 16] = [
    "how", "do", "i", "get", "go", "wanna", "want", "to", "travel", "the", "take", "me", "can",
    "you", "please", "need",
];

/// Origin and destination names found in a query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TripEndpoints {
    /// Where the trip starts, when stated.
    pub origin: Option<String>,
    /// Where the trip ends, when stated.
    pub destination: Option<String>,
}

/// Extracts trip endpoints with the completion capability, falling back to
/// a local parser.
#[derive(Clone)]
pub struct LocationExtractor {
    completion: Option<Arc<dyn CompletionProvider>>,
    timeout: Duration,
}

impl LocationExtractor {
    /// Creates an extractor backed by `completion`.
    #[must_use]
    pub fn new(completion: Arc<dyn CompletionProvider>, timeout: Duration) -> Self {
        Self {
            completion: Some(completion),
            timeout,
        }
    }

    /// Creates an extractor that only uses the local parser.
    #[must_use]
    pub const fn basic() -> Self {
        Self {
            completion: None,
            timeout: Duration::ZERO,
        }
    }

    /// Returns the completion backend name, if one is configured.
    #[must_use]
    pub fn provider_name(&self) -> Option<&'static str> {
        self.completion
            .as_ref()
            .map(|completion| completion.provider_name())
    }

    /// Extracts the endpoints of `query`.
    pub async fn extract(&self, query: &str) -> TripEndpoints {
        let Some(completion) = &self.completion else {
            return extract_basic(query);
        };

        let prompt = match render_prompt(query) {
            Ok(prompt) => prompt,
            Err(err) => {
                tracing::warn!(error = %err, "extraction prompt failed to render");
                return extract_basic(query);
            }
        };
        let options = CompletionOptions::deterministic(50, self.timeout);
        match completion.complete(&CompletionPrompt::user(prompt), &options).await {
            Ok(answer) => parse_pipe_answer(&answer).unwrap_or_else(|| extract_basic(query)),
            Err(err) => {
                tracing::warn!(error = %err, "location extraction fell back to the local parser");
                extract_basic(query)
            }
        }
    }
}

fn render_prompt(query: &str) -> Result<String, minijinja::Error> {
    let environment = Environment::new();
    environment.render_str(
        EXTRACTION_TEMPLATE,
        context! { query => query, examples => EXAMPLES.to_vec() },
    )
}

/// Parses an `origin|destination` model answer; `none` marks a missing
/// side.
#[must_use]
pub fn parse_pipe_answer(answer: &str) -> Option<TripEndpoints> {
    let line = answer.lines().find(|line| line.contains('|'))?;
    let (origin, destination) = line.split_once('|')?;
    Some(TripEndpoints {
        origin: known_location(origin),
        destination: known_location(destination),
    })
}

fn known_location(raw: &str) -> Option<String> {
    let cleaned = clean(raw);
    (!cleaned.is_empty() && !cleaned.eq_ignore_ascii_case("none")).then_some(cleaned)
}

fn clean(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c: char| matches!(c, '?' | '.' | ',' | '!' | '"' | '\''))
        .trim()
        .to_owned()
}

fn strip_fillers(raw: &str) -> Option<String> {
    let kept: Vec<&str> = raw
        .split_whitespace()
        .filter(|word| !FILLER_WORDS.contains(word))
        .collect();
    known_location(&kept.join(" "))
}

/// Parses `from X to Y`, `to Y from X` and `X to Y` phrasings.
#[must_use]
pub fn extract_basic(query: &str) -> TripEndpoints {
    let padded = format!(" {} ", query.trim().to_lowercase());

    if let Some((before_from, after_from)) = padded.split_once(" from ") {
        if let Some((origin, destination)) = after_from.split_once(" to ") {
            return TripEndpoints {
                origin: known_location(origin),
                destination: known_location(destination),
            };
        }
        let destination = before_from
            .rsplit_once(" to ")
            .and_then(|(_, destination)| known_location(destination));
        return TripEndpoints {
            origin: known_location(after_from),
            destination,
        };
    }

    if let Some((before, after)) = padded.split_once(" to ") {
        return TripEndpoints {
            origin: strip_fillers(before),
            destination: known_location(after),
        };
    }

    TripEndpoints::default()
}
