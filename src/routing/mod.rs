//! Query routing: classification into an execution plan and fast-path
//! dispatch to a single capability agent.
//!
//! - `domain` holds queries, execution plans and classifications.
//! - `services` holds the classifier, live-agent discovery shared with the
//!   coordination path, and the capability router.

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
