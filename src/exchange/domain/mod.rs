//! Exchange domain types.

mod error;
mod gate;
mod reply;

pub use error::{ExchangeError, ExchangeResult};
pub use gate::{GateState, StartupGate};
pub use reply::{ChatReply, ExchangeHealth};
