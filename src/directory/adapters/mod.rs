//! Adapter implementations for directory ports.

pub mod http;
pub mod memory;
