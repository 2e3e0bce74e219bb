//! Coordination session domain.

mod error;
mod failure;
mod ids;
mod outcome;
mod session;
mod state;

pub use error::{ParseSessionStateError, SessionDomainError};
pub use failure::{FailureCause, FailureKind};
pub use ids::SessionId;
pub use outcome::{AgentAnswer, AggregatedAnswer, SessionOutcome};
pub use session::{CoordinationSession, ResponseSlot, SlotOutcome};
pub use state::SessionState;
