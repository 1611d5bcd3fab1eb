//! Agent replies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::properties::{parse_properties_block, split_properties_block};
use crate::error::CasaError;
use crate::listing::Listing;

/// One answer from the chat agent, with its properties block isolated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChatReply {
    /// Reply text with every properties block removed.
    pub text: String,
    /// The reply exactly as the agent sent it.
    pub raw_text: String,
    /// Body of the first properties block, still undecoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties_block: Option<String>,
    /// Prompt the agent actually sent to its search tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_prompt: Option<String>,
    /// Raw output of the agent's search tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_details: Option<Value>,
}

/// Display-ready form of a [`ChatReply`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtractedReply {
    pub text: String,
    pub listings: Vec<Listing>,
    /// Set when the properties block was present but could not be decoded.
    pub parse_error: Option<CasaError>,
}

impl ChatReply {
    /// Builds a reply from the agent's raw response text.
    pub fn from_raw(
        raw_text: impl Into<String>,
        used_prompt: Option<String>,
        tool_details: Option<Value>,
    ) -> Self {
        let raw_text = raw_text.into();
        let (text, properties_block) = split_properties_block(&raw_text);
        Self {
            text,
            raw_text,
            properties_block,
            used_prompt,
            tool_details,
        }
    }

    /// Decodes the properties block.
    ///
    /// A malformed block never fails the reply: it is logged, the listings
    /// come back empty and the surrounding prose is kept. If the reply had no
    /// prose at all, the raw text is shown instead of an empty bubble.
    pub fn extract(&self) -> ExtractedReply {
        let Some(block) = self.properties_block.as_deref() else {
            return ExtractedReply {
                text: self.text.clone(),
                ..Default::default()
            };
        };

        match parse_properties_block(block) {
            Ok(listings) => ExtractedReply {
                text: self.text.clone(),
                listings,
                parse_error: None,
            },
            Err(err) => {
                tracing::warn!("Failed to parse properties block: {}", err);
                let text = if self.text.is_empty() {
                    self.raw_text.trim().to_string()
                } else {
                    self.text.clone()
                };
                ExtractedReply {
                    text,
                    listings: Vec::new(),
                    parse_error: Some(err),
                }
            }
        }
    }
}
