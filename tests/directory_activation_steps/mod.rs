//! Step definitions for directory activation scenarios.

mod given;
mod then;
mod when;
pub mod world;
