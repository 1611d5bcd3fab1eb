//! Scripted `PropertyService` for controller tests.

use async_trait::async_trait;
use casa_core::chat::ChatReply;
use casa_core::error::{CasaError, Result};
use casa_core::history::HistoryRow;
use casa_core::image::GeneratedImage;
use casa_core::listing::{Listing, ListingId};
use casa_core::search::{SearchMode, SearchOutcome};
use casa_core::service::PropertyService;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Answers each call with the next scripted result, or an error when the
/// script runs dry. A gated mock holds every call until [`release`] is called
/// once per call.
///
/// [`release`]: MockPropertyService::release
#[derive(Default)]
pub(crate) struct MockPropertyService {
    gate: Option<Notify>,
    searches: Mutex<VecDeque<Result<SearchOutcome>>>,
    replies: Mutex<VecDeque<Result<ChatReply>>>,
    images: Mutex<VecDeque<Result<GeneratedImage>>>,
    history: Mutex<VecDeque<Result<Vec<HistoryRow>>>>,
    search_calls: AtomicUsize,
    chat_calls: AtomicUsize,
    image_calls: AtomicUsize,
    history_calls: AtomicUsize,
    last_search: Mutex<Option<(String, Option<SearchMode>)>>,
    last_chat: Mutex<Option<(String, String)>>,
    last_where_clause: Mutex<Option<String>>,
}

impl MockPropertyService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated() -> Self {
        Self {
            gate: Some(Notify::new()),
            ..Default::default()
        }
    }

    /// Lets one held call proceed.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn push_search(&self, result: Result<SearchOutcome>) {
        self.searches.lock().unwrap().push_back(result);
    }

    pub fn push_reply(&self, result: Result<ChatReply>) {
        self.replies.lock().unwrap().push_back(result);
    }

    pub fn push_image(&self, result: Result<GeneratedImage>) {
        self.images.lock().unwrap().push_back(result);
    }

    pub fn push_history(&self, result: Result<Vec<HistoryRow>>) {
        self.history.lock().unwrap().push_back(result);
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }

    pub fn image_calls(&self) -> usize {
        self.image_calls.load(Ordering::SeqCst)
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    pub fn last_search(&self) -> Option<(String, Option<SearchMode>)> {
        self.last_search.lock().unwrap().clone()
    }

    pub fn last_chat(&self) -> Option<(String, String)> {
        self.last_chat.lock().unwrap().clone()
    }

    pub fn last_where_clause(&self) -> Option<String> {
        self.last_where_clause.lock().unwrap().clone()
    }

    async fn hold(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }
}

fn next<T>(queue: &Mutex<VecDeque<Result<T>>>) -> Result<T> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(CasaError::network("no scripted response")))
}

#[async_trait]
impl PropertyService for MockPropertyService {
    async fn search(&self, query: &str, mode: Option<SearchMode>) -> Result<SearchOutcome> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_search.lock().unwrap() = Some((query.to_string(), mode));
        self.hold().await;
        next(&self.searches)
    }

    async fn chat_turn(&self, session_id: &str, message: &str) -> Result<ChatReply> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_chat.lock().unwrap() = Some((session_id.to_string(), message.to_string()));
        self.hold().await;
        next(&self.replies)
    }

    async fn generate_image(&self, _description: &str) -> Result<GeneratedImage> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        self.hold().await;
        next(&self.images)
    }

    async fn query_history(&self, where_clause: &str) -> Result<Vec<HistoryRow>> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_where_clause.lock().unwrap() = Some(where_clause.to_string());
        self.hold().await;
        next(&self.history)
    }
}

pub(crate) fn listing(id: i64, title: &str) -> Listing {
    Listing {
        id: Some(ListingId::Number(id)),
        title: title.to_string(),
        description: format!("{title} with a view"),
        city: "Zurich".to_string(),
        price: Some(2500.0),
        ..Default::default()
    }
}

pub(crate) fn outcome(listings: Vec<Listing>) -> SearchOutcome {
    SearchOutcome {
        listings,
        ..Default::default()
    }
}

pub(crate) fn history_row(prompt: &str) -> HistoryRow {
    HistoryRow {
        user_prompt: Some(prompt.to_string()),
        ..Default::default()
    }
}
