//! Remote property service contract.

use async_trait::async_trait;

use crate::chat::ChatReply;
use crate::error::Result;
use crate::history::HistoryRow;
use crate::image::GeneratedImage;
use crate::search::{SearchMode, SearchOutcome};

/// The four remote operations the client depends on.
///
/// Each call is a single request/response exchange: implementations hold no
/// state between calls and never retry on their own.
#[async_trait]
pub trait PropertyService: Send + Sync {
    /// Runs a search.
    ///
    /// # Errors
    /// `CasaError::Service` when the backend answers with a failure status,
    /// `CasaError::Network` when no response arrives.
    async fn search(&self, query: &str, mode: Option<SearchMode>) -> Result<SearchOutcome>;

    /// Sends one chat turn for the conversation identified by `session_id`.
    ///
    /// The returned reply already has its `json_properties` block isolated
    /// from the display text.
    async fn chat_turn(&self, session_id: &str, message: &str) -> Result<ChatReply>;

    /// Generates an illustrative image for a listing description.
    ///
    /// # Errors
    /// Always `CasaError::Generation` on failure.
    async fn generate_image(&self, description: &str) -> Result<GeneratedImage>;

    /// Fetches prompt history rows matching `where_clause`.
    ///
    /// The clause is passed through untouched; an empty clause means no
    /// filter. The backend caps the answer at 1000 rows.
    async fn query_history(&self, where_clause: &str) -> Result<Vec<HistoryRow>>;
}
