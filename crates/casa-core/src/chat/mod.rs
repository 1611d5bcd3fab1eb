//! Chat domain module.
//!
//! - `message`: transcript entries (`ChatRole`, `ChatMessage`)
//! - `reply`: one answer from the chat agent (`ChatReply`)
//! - `properties`: the fenced `json_properties` block agents embed in replies

mod message;
pub mod properties;
mod reply;

pub use message::{ChatMessage, ChatRole};
pub use properties::{PROPERTIES_FENCE, parse_properties_block, split_properties_block};
pub use reply::{ChatReply, ExtractedReply};
