//! Isolation and decoding of the `json_properties` block.
//!
//! Agents append the listings they found as a fenced block:
//!
//! ````text
//! I found 2 studios in Geneva.
//! ```json_properties
//! [{"id": 1, "title": "Studio", "price": 1800, "city": "Geneva"}]
//! ```
//! ````

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CasaError, Result};
use crate::listing::Listing;

/// Tag that opens a properties block.
pub const PROPERTIES_FENCE: &str = "```json_properties";

static PROPERTIES_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```json_properties[ \t]*\r?\n(.*?)\r?\n?```")
        .expect("properties block pattern is valid")
});

/// Splits a raw agent reply into display text and the body of its first
/// properties block.
///
/// Every block is removed from the display text, so the fence never reaches
/// the user. Text without a block is returned trimmed and unchanged.
pub fn split_properties_block(reply: &str) -> (String, Option<String>) {
    let block = PROPERTIES_BLOCK
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    match block {
        Some(body) => {
            let text = PROPERTIES_BLOCK.replace_all(reply, "");
            (text.trim().to_string(), Some(body))
        }
        None => (reply.trim().to_string(), None),
    }
}

/// Decodes a properties block body into listings.
///
/// Raw storage image references are rewritten to the proxy form.
///
/// # Errors
/// `CasaError::Parse` when the body is not a JSON array of listings.
pub fn parse_properties_block(body: &str) -> Result<Vec<Listing>> {
    let mut listings: Vec<Listing> = serde_json::from_str(body)
        .map_err(|e| CasaError::parse(format!("invalid json_properties block: {e}")))?;
    for listing in &mut listings {
        listing.normalize_image_ref();
    }
    Ok(listings)
}
