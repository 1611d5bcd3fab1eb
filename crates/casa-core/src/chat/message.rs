//! Chat transcript entries.

use serde::{Deserialize, Serialize};

use crate::listing::Listing;

/// Author of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Message typed by the user.
    User,
    /// Message produced by the chat agent.
    Model,
}

/// A single entry in a chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    /// Listings the agent attached to this reply, in the order it sent them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub listings: Vec<Listing>,
    /// Marks the transient "thinking" entry shown while a turn is in flight.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub placeholder: bool,
    /// Creation time (RFC 3339).
    pub timestamp: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(ChatRole::User, text.into(), Vec::new(), false)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new(ChatRole::Model, text.into(), Vec::new(), false)
    }

    pub fn model_with_listings(text: impl Into<String>, listings: Vec<Listing>) -> Self {
        Self::new(ChatRole::Model, text.into(), listings, false)
    }

    /// The loading entry appended while waiting for the agent.
    pub fn thinking() -> Self {
        Self::new(ChatRole::Model, "Thinking...".to_string(), Vec::new(), true)
    }

    fn new(role: ChatRole, text: String, listings: Vec<Listing>, placeholder: bool) -> Self {
        Self {
            role,
            text,
            listings,
            placeholder,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
