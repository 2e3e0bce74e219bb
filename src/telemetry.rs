//! Tracing subscriber installation for the binaries.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "transit_exchange=info";

/// Raised when a global subscriber is already installed.
#[derive(Debug, Error)]
#[error("failed to install tracing subscriber: {0}")]
pub struct TelemetryError(String);

/// Builds the filter from a `RUST_LOG`-style directive string.
#[must_use]
pub fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs a formatted subscriber filtered by `RUST_LOG`.
///
/// # Errors
///
/// Returns [`TelemetryError`] when a global subscriber already exists.
pub fn init_tracing() -> Result<(), TelemetryError> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(filter_from(directives.as_deref()))
        .with_target(true)
        .try_init()
        .map_err(|err| TelemetryError(err.to_string()))
}
