//! Routing services.

mod classifier;
mod discovery;
mod router;

pub use classifier::{ClassifierSettings, DEFAULT_CONFIDENCE_THRESHOLD, QueryClassifier};
pub use discovery::{AgentDiscovery, Assignment, DiscoveryError, SelectedAgents};
pub use router::{CapabilityRouter, RoutedReply, RoutingError};
