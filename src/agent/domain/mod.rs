//! Agent-side request and reply types.

mod reply;

pub use reply::{CapabilityRequest, HandlerReply, ReplyStatus};
