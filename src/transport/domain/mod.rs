//! Wire-level value objects shared by every transport variant.

mod envelope;
mod kind;

pub use envelope::{A2aMessage, AgentCall, AgentReply, MessageKind, StreamFrame};
pub use kind::{ParseTransportKindError, TransportKind};
