//! `service_alerts` capability.

use crate::agent::domain::{CapabilityRequest, HandlerReply};
use crate::agent::ports::{CapabilityHandler, HandlerResult};
use crate::directory::domain::CapabilityTag;
use crate::planner::domain::Route;
use crate::planner::ports::TransitDataProvider;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

const ASK_FOR_ROUTE: &str =
    "Which route would you like alerts for? For example: 'Are there delays on the Red Line?'";

/// Reports active alerts for the route named in the request.
#[derive(Clone)]
pub struct ServiceAlertsHandler {
    provider: Arc<dyn TransitDataProvider>,
}

impl ServiceAlertsHandler {
    /// Creates a handler over `provider`.
    #[must_use]
    pub fn new(provider: Arc<dyn TransitDataProvider>) -> Self {
        Self { provider }
    }

    async fn resolve_route(&self, message: &str) -> HandlerResult<Option<Route>> {
        for mention in route_mentions(message) {
            if let Some(route) = self.provider.find_route(&mention).await? {
                return Ok(Some(route));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl CapabilityHandler for ServiceAlertsHandler {
    fn capability(&self) -> CapabilityTag {
        CapabilityTag::service_alerts()
    }

    async fn handle(&self, request: &CapabilityRequest) -> HandlerResult<HandlerReply> {
        let Some(route) = self.resolve_route(&request.message).await? else {
            return Ok(HandlerReply::needs_input(ASK_FOR_ROUTE));
        };
        let alerts = self.provider.alerts(&route.id).await?;
        tracing::info!(route = %route.id, count = alerts.len(), "alerts fetched");

        let text = if alerts.is_empty() {
            format!("There are no active alerts for the {}.", route.name)
        } else {
            let lines: Vec<String> = alerts
                .iter()
                .map(|alert| format!("- {}", alert.header))
                .collect();
            format!(
                "Active alerts for the {} ({}):\n{}",
                route.name,
                alerts.len(),
                lines.join("\n")
            )
        };
        Ok(HandlerReply::answered(text)
            .with_detail("route", json!({"id": route.id, "name": route.name}))
            .with_detail("alerts", json!(alerts)))
    }
}

/// Returns route phrases mentioned in `message`, most specific first.
///
/// Recognises `<colour> line`, `route <n>` and `bus <n>`, then falls back to
/// the whole message for bare ids such as `Red`.
pub(crate) fn route_mentions(message: &str) -> Vec<String> {
    let words: Vec<String> = message
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect();

    let mut mentions = Vec::new();
    for (current, next) in words.iter().zip(words.iter().skip(1)) {
        if next == "line" {
            mentions.push(format!("{current} line"));
        } else if current == "route" || current == "bus" {
            mentions.push(next.clone());
        }
    }
    let whole = message.trim();
    if !whole.is_empty() {
        mentions.push(whole.to_owned());
    }
    mentions
}
