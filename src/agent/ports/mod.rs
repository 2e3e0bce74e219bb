//! Agent ports.

mod handler;

pub use handler::{CapabilityHandler, HandlerError, HandlerResult};
