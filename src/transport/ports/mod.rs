//! Port definitions for agent transport.

pub(crate) mod channel;

pub use channel::{TransportChannel, TransportError, TransportResult};
