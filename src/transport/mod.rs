//! Transport channel: uniform request/response delivery to capability
//! agents.
//!
//! Callers depend on the [`ports::TransportChannel`] trait only. Two network
//! variants implement it: a single-shot HTTP call per request and a
//! multiplexed TCP stream reused across requests to the same endpoint. The
//! variant is chosen by configuration through [`adapters::build_channel`].

pub mod adapters;
pub mod domain;
pub mod ports;
