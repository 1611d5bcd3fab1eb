//! Application layer for Casa.
//!
//! The four controllers that sit between a shell and the remote
//! [`PropertyService`](casa_core::PropertyService). Each keeps its view state
//! in a [`StateStore`](casa_core::StateStore) that shells read and subscribe
//! to; none of them knows how it is rendered.

pub mod chat_controller;
pub mod enrichment_controller;
pub mod history_browser;
pub mod search_controller;
pub mod status;

#[cfg(test)]
mod test_support;

pub use chat_controller::{CHAT_FAILURE_NOTICE, CHAT_GREETING, ChatController, ChatSession, SendOutcome};
pub use enrichment_controller::{EnrichmentController, ImageRequestOutcome, ImageStates};
pub use history_browser::{HistoryBrowser, HistoryView, QueryOutcome};
pub use search_controller::{ExternalResult, SearchController, SearchSession, SubmitOutcome};
pub use status::{Rejection, RequestStatus};
