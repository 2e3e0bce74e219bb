//! Domain model for the agent directory.
//!
//! The directory domain models agent identity, capability tags, endpoint
//! addresses and the activation lifecycle. Infrastructure concerns are kept
//! outside the domain boundary.

mod capability;
mod endpoint;
mod error;
mod ids;
mod record;
mod state;

pub use capability::{CapabilityTag, well_known};
pub use endpoint::{AgentEndpoint, EndpointScheme};
pub use error::{DirectoryDomainError, ParseActivationStateError};
pub use ids::AgentId;
pub use record::{AgentRecord, PersistedAgentData};
pub use state::ActivationState;
