//! `trip_planning` capability.

use crate::agent::domain::{CapabilityRequest, HandlerReply};
use crate::agent::ports::{CapabilityHandler, HandlerResult};
use crate::directory::domain::CapabilityTag;
use crate::planner::ports::TransitDataProvider;
use crate::planner::services::{TripAnswer, TripPlanner};
use async_trait::async_trait;
use serde_json::{Value, json};

/// Answers free-text trip requests with a one-transfer plan.
#[derive(Clone)]
pub struct TripPlanningHandler {
    planner: TripPlanner<dyn TransitDataProvider>,
}

impl TripPlanningHandler {
    /// Wraps `planner`.
    #[must_use]
    pub const fn new(planner: TripPlanner<dyn TransitDataProvider>) -> Self {
        Self { planner }
    }
}

#[async_trait]
impl CapabilityHandler for TripPlanningHandler {
    fn capability(&self) -> CapabilityTag {
        CapabilityTag::trip_planning()
    }

    async fn handle(&self, request: &CapabilityRequest) -> HandlerResult<HandlerReply> {
        let answer = self.planner.answer(&request.message).await;
        Ok(to_reply(&answer))
    }
}

pub(crate) fn to_reply(answer: &TripAnswer) -> HandlerReply {
    let text = answer.text();
    match answer {
        TripAnswer::Planned(plan) => {
            let transfers = match &plan.outcome {
                Ok(candidate) => json!(candidate.hops()),
                Err(_) => Value::Null,
            };
            HandlerReply::answered(text)
                .with_detail("origin", json!({"id": plan.origin.id, "name": plan.origin.name}))
                .with_detail(
                    "destination",
                    json!({"id": plan.destination.id, "name": plan.destination.name}),
                )
                .with_detail("transfers", transfers)
        }
        TripAnswer::MissingOrigin { destination } => {
            HandlerReply::needs_input(text).with_detail("destination_parsed", json!(destination))
        }
        TripAnswer::MissingDestination | TripAnswer::Failed(_) => HandlerReply::unanswered(text),
    }
}
