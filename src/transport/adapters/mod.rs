//! Transport adapters.

pub mod http;
pub mod memory;
pub mod stream;

pub use http::HttpDirectChannel;
pub use memory::{InMemoryChannel, ScriptedAnswer};
pub use stream::MultiplexedStreamChannel;

use crate::transport::domain::TransportKind;
use crate::transport::ports::TransportChannel;
use std::sync::Arc;

/// Builds the network channel selected by configuration.
#[must_use]
pub fn build_channel(kind: TransportKind) -> Arc<dyn TransportChannel> {
    match kind {
        TransportKind::Direct => Arc::new(HttpDirectChannel::new()),
        TransportKind::Multiplexed => Arc::new(MultiplexedStreamChannel::new()),
    }
}
