//! Capability handlers and the multiplexed stream listener.

pub mod alerts;
pub mod stops;
pub mod stream_listener;
pub mod trip;

pub use alerts::ServiceAlertsHandler;
pub use stops::StopInfoHandler;
pub use stream_listener::serve_stream;
pub use trip::TripPlanningHandler;
