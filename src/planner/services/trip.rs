//! Trip planning over live transit data.

use super::extraction::LocationExtractor;
use super::snapshot::{NetworkSnapshot, load_snapshot};
use crate::planner::domain::{PlanError, Stop, TransferCandidate, plan_transfer};
use crate::planner::ports::{TransitDataError, TransitDataProvider};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while planning a trip between named stops.
#[derive(Debug, Clone, Error)]
pub enum TripPlanError {
    /// No stop matches the given name.
    #[error("no stop matches '{0}'")]
    UnknownStop(String),

    /// The transit data provider failed.
    #[error(transparent)]
    Provider(#[from] TransitDataError),
}

impl TripPlanError {
    /// Returns the explanation shown to the rider.
    #[must_use]
    pub fn user_text(&self) -> String {
        match self {
            Self::UnknownStop(name) => format!(
                "Sorry, I couldn't find a stop matching '{name}'. Please check the name and try again."
            ),
            Self::Provider(_) => {
                "Sorry, I couldn't plan your route at this time. Please try again later.".to_owned()
            }
        }
    }
}

/// A planned trip between two resolved stops.
#[derive(Debug, Clone)]
pub struct TripPlan {
    /// Resolved origin.
    pub origin: Stop,
    /// Resolved destination.
    pub destination: Stop,
    /// Search result.
    pub outcome: Result<TransferCandidate, PlanError>,
    /// Rider-facing description.
    pub text: String,
}

/// Answer to a free-text trip request.
#[derive(Debug, Clone)]
pub enum TripAnswer {
    /// The query names no destination.
    MissingDestination,
    /// The query names a destination but no origin.
    MissingOrigin {
        /// Destination as typed.
        destination: String,
    },
    /// Both ends were resolved and searched.
    Planned(TripPlan),
    /// Planning failed.
    Failed(TripPlanError),
}

impl TripAnswer {
    /// Returns the rider-facing text.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::MissingDestination => "I couldn't understand where you want to go. Please specify \
                your destination. For example: 'How do I get to Harvard?' or 'Take me from Park \
                Street to Kenmore.'"
                .to_owned(),
            Self::MissingOrigin { destination } => format!(
                "I can help you get to {destination}! Where are you starting from? For example: \
                 'From Park Street to {destination}'"
            ),
            Self::Planned(plan) => plan.text.clone(),
            Self::Failed(err) => err.user_text(),
        }
    }

    /// Returns the status reported in response metadata.
    #[must_use]
    pub const fn status(&self) -> &'static str {
        match self {
            Self::MissingOrigin { .. } => "partial",
            Self::Planned(_) => "success",
            Self::MissingDestination | Self::Failed(_) => "error",
        }
    }
}

/// Resolves stop names, loads a graph snapshot and runs the search.
pub struct TripPlanner<P>
where
    P: TransitDataProvider + ?Sized,
{
    provider: Arc<P>,
    extractor: LocationExtractor,
}

impl<P> Clone for TripPlanner<P>
where
    P: TransitDataProvider + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            extractor: self.extractor.clone(),
        }
    }
}

impl<P> TripPlanner<P>
where
    P: TransitDataProvider + ?Sized,
{
    /// Creates a planner over `provider`.
    #[must_use]
    pub const fn new(provider: Arc<P>, extractor: LocationExtractor) -> Self {
        Self {
            provider,
            extractor,
        }
    }

    /// Returns the location extractor.
    #[must_use]
    pub const fn extractor(&self) -> &LocationExtractor {
        &self.extractor
    }

    /// Plans a trip between two stop names.
    ///
    /// Running out of search depth is not an error: the plan carries
    /// [`PlanError::NoRouteFound`] and an explanatory text.
    ///
    /// # Errors
    ///
    /// Returns [`TripPlanError::UnknownStop`] when a name resolves to no stop
    /// and [`TripPlanError::Provider`] when the data provider fails.
    pub async fn plan(&self, origin: &str, destination: &str) -> Result<TripPlan, TripPlanError> {
        let origin_stop = self.resolve(origin).await?;
        let destination_stop = self.resolve(destination).await?;

        let snapshot =
            load_snapshot(self.provider.as_ref(), &origin_stop.id, &destination_stop.id).await?;
        let outcome = plan_transfer(&snapshot.graph, &origin_stop.id, &destination_stop.id);
        let text = describe(&snapshot, &origin_stop, &destination_stop, &outcome);
        tracing::info!(
            origin = %origin_stop.id,
            destination = %destination_stop.id,
            found = outcome.is_ok(),
            "trip planned"
        );

        Ok(TripPlan {
            origin: origin_stop,
            destination: destination_stop,
            outcome,
            text,
        })
    }

    /// Answers a free-text trip request.
    pub async fn answer(&self, query: &str) -> TripAnswer {
        let endpoints = self.extractor.extract(query).await;
        let Some(destination) = endpoints.destination else {
            return TripAnswer::MissingDestination;
        };
        let Some(origin) = endpoints.origin else {
            return TripAnswer::MissingOrigin { destination };
        };
        match self.plan(&origin, &destination).await {
            Ok(plan) => TripAnswer::Planned(plan),
            Err(err) => {
                tracing::warn!(error = %err, "trip planning failed");
                TripAnswer::Failed(err)
            }
        }
    }

    async fn resolve(&self, name: &str) -> Result<Stop, TripPlanError> {
        self.provider
            .find_stop(name)
            .await?
            .ok_or_else(|| TripPlanError::UnknownStop(name.trim().to_owned()))
    }
}

fn describe(
    snapshot: &NetworkSnapshot,
    origin: &Stop,
    destination: &Stop,
    outcome: &Result<TransferCandidate, PlanError>,
) -> String {
    match outcome {
        Ok(candidate) => match (candidate.transfer_stop(), candidate.second_route()) {
            (Some(transfer), Some(second)) => format!(
                "Take the {} from {} to {}, then transfer to the {} to {}.",
                snapshot.route_name(candidate.first_route()),
                origin.name,
                snapshot.stop_name(transfer),
                snapshot.route_name(second),
                destination.name,
            ),
            _ => format!(
                "Take the {} from {} to {}.",
                snapshot.route_name(candidate.first_route()),
                origin.name,
                destination.name,
            ),
        },
        Err(PlanError::NoRouteFound { .. }) => format!(
            "No route found within search depth between {} and {}. You may need more than one \
             transfer.",
            origin.name, destination.name,
        ),
    }
}
