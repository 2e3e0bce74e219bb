//! Port definitions for the completion capability.

mod provider;

#[cfg(test)]
pub use provider::MockCompletionProvider;
pub use provider::{CompletionError, CompletionProvider, CompletionResult};
