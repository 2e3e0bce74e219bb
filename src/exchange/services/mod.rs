//! Exchange services.

mod facade;

pub use facade::{ExchangeCore, compose_answer};
