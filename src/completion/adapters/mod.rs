//! Completion adapters.

mod http;
mod scripted;

pub use http::HttpCompletionProvider;
pub use scripted::ScriptedCompletion;
