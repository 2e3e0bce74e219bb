//! Coordination services.

mod orchestrator;

pub use orchestrator::{
    CoordinationError, CoordinationOrchestrator, CoordinationResult, DEFAULT_SESSION_DEADLINE,
};
