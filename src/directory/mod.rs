//! Agent directory: registration, activation and discovery of capability
//! agents.
//!
//! Records move through an explicit activation state machine
//! (`registered → active → deregistered`). A freshly registered agent is
//! invisible to live listings until it has been activated. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
