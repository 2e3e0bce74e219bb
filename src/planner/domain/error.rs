//! Planner error types.

use super::StopId;
use thiserror::Error;

/// Validation errors for planner value objects.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlannerDomainError {
    /// A stop identifier is empty after trimming.
    #[error("stop id must not be empty")]
    EmptyStopId,

    /// A route identifier is empty after trimming.
    #[error("route id must not be empty")]
    EmptyRouteId,
}

/// Outcome of a search that produced no candidate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlanError {
    /// Neither a direct route nor a single transfer connects the stops.
    #[error("no route found within search depth from {origin} to {destination}")]
    NoRouteFound {
        /// Origin stop.
        origin: StopId,
        /// Destination stop.
        destination: StopId,
    },
}
