//! Completion capability: the single port through which the crate talks to
//! large language models.
//!
//! - `domain` holds provider selection and per-call options.
//! - `ports` defines the [`ports::CompletionProvider`] contract.
//! - `adapters` provides the Anthropic/OpenAI HTTP client and a scripted
//!   provider for tests.

pub mod adapters;
pub mod domain;
pub mod ports;
