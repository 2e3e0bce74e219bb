//! Transfer route planner and the trip-planning capability built on it.
//!
//! - `domain` holds the immutable route graph, the one-transfer search and
//!   the transit value objects.
//! - `ports` defines the transit data provider contract.
//! - `adapters` provides the MBTA v3 client and a static in-memory network.
//! - `services` loads graph snapshots, extracts trip endpoints from free text
//!   and renders answers.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
