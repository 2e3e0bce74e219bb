//! Planner domain: route graph, search and transit value objects.

mod candidate;
mod error;
mod graph;
mod ids;
mod network;
mod search;

pub use candidate::TransferCandidate;
pub use error::{PlanError, PlannerDomainError};
pub use graph::RouteGraph;
pub use ids::{RouteId, StopId};
pub use network::{Alert, Route, Stop};
pub use search::plan_transfer;
