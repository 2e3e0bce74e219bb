//! Routing domain types.

mod plan;
mod query;

pub use plan::{ExecutionPlan, PathKind};
pub use query::{Classification, ClassificationSource, Query};
