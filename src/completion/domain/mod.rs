//! Completion value objects.

mod options;
mod provider;

pub use options::{CompletionOptions, CompletionPrompt};
pub use provider::{ParseProviderKindError, ProviderKind, ProviderSettings};
