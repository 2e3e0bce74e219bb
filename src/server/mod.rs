//! HTTP surfaces for the three process roles.
//!
//! Each role gets its own [`axum::Router`]: the directory, the capability
//! agent and the exchange. Service errors are mapped onto status codes by
//! [`ApiError`].

mod agent;
mod directory;
mod error;
mod exchange;

pub use agent::{AgentSurface, PLAN_TRIP_TOOL, agent_router};
pub use directory::directory_router;
pub use error::ApiError;
pub use exchange::exchange_router;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Serves `router` on `listener` until `shutdown` is cancelled.
///
/// # Errors
///
/// Returns the I/O error that stopped the server.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "http surface listening");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

#[cfg(test)]
mod tests;
