//! Capability agent runtime.
//!
//! An agent process serves one or more capability tags. Incoming
//! envelopes are dispatched through a [`services::HandlerRegistry`] to the
//! [`ports::CapabilityHandler`] registered for each tag; the registry is
//! reachable over HTTP (see `crate::server`) and over the multiplexed
//! stream listener in [`adapters::stream_listener`].

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
