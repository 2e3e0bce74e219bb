//! `stop_info` capability.

use crate::agent::domain::{CapabilityRequest, HandlerReply};
use crate::agent::ports::{CapabilityHandler, HandlerResult};
use crate::directory::domain::CapabilityTag;
use crate::planner::ports::TransitDataProvider;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

const FILLER: &[&str] = &[
    "where", "is", "the", "stop", "station", "info", "information", "about", "tell", "me",
    "for", "what", "whats", "which", "lines", "routes", "serve", "serves", "at", "a", "show",
    "find", "on",
];

/// Looks up a stop by name and lists the routes calling there.
#[derive(Clone)]
pub struct StopInfoHandler {
    provider: Arc<dyn TransitDataProvider>,
}

impl StopInfoHandler {
    /// Creates a handler over `provider`.
    #[must_use]
    pub fn new(provider: Arc<dyn TransitDataProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl CapabilityHandler for StopInfoHandler {
    fn capability(&self) -> CapabilityTag {
        CapabilityTag::stop_info()
    }

    async fn handle(&self, request: &CapabilityRequest) -> HandlerResult<HandlerReply> {
        let name = stop_phrase(&request.message);
        if name.is_empty() {
            return Ok(HandlerReply::needs_input(
                "Which stop would you like to know about? For example: 'Tell me about Kendall/MIT.'",
            ));
        }
        let Some(stop) = self.provider.find_stop(&name).await? else {
            return Ok(HandlerReply::unanswered(format!(
                "Sorry, I couldn't find a stop matching '{name}'. Please check the name and try again."
            )));
        };

        let routes = self.provider.routes_at(&stop.id).await?;
        let names: Vec<&str> = routes.iter().map(|route| route.name.as_str()).collect();
        let text = if names.is_empty() {
            format!("{} (stop {}) has no scheduled routes.", stop.name, stop.id)
        } else {
            format!(
                "{} (stop {}) is served by {}.",
                stop.name,
                stop.id,
                names.join(", ")
            )
        };
        Ok(HandlerReply::answered(text)
            .with_detail("stop", json!(stop))
            .with_detail("routes", json!(routes)))
    }
}

/// Strips question words from `message`, leaving the stop name.
pub(crate) fn stop_phrase(message: &str) -> String {
    message
        .split(|ch: char| ch.is_whitespace() || matches!(ch, '?' | '!' | ',' | '.'))
        .filter(|word| !word.is_empty())
        .filter(|word| !FILLER.contains(&word.to_lowercase().as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}
