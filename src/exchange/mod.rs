//! Exchange core: the chat facade in front of routing and coordination.
//!
//! Owns the startup validation gate that enables the coordinated path and
//! the [`domain::ExchangeError`] taxonomy exposed to chat clients.

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
