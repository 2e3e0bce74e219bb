//! Multi-agent coordination for the coordinated path.
//!
//! - `domain` holds the session aggregate, its state machine, response
//!   slots and outcomes.
//! - `services` holds the orchestrator that drives one session from
//!   directory lookup to a terminal state.

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
