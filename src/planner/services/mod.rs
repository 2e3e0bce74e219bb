//! Planner services.

mod extraction;
mod snapshot;
mod trip;

pub use extraction::{LocationExtractor, TripEndpoints, extract_basic, parse_pipe_answer};
pub use snapshot::{NetworkSnapshot, load_snapshot};
pub use trip::{TripAnswer, TripPlan, TripPlanError, TripPlanner};
