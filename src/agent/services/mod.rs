//! Agent services.

mod registry;

pub use registry::HandlerRegistry;
