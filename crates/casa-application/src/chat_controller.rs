//! Chat session controller.
//!
//! One controller lives for one chat panel. It owns the transcript and the
//! session id the backend uses to correlate turns, and republishes the
//! listings the agent finds to the search controller.

use crate::search_controller::{ExternalResult, SearchController};
use crate::status::{Rejection, RequestStatus};
use casa_core::chat::{ChatMessage, ChatReply};
use casa_core::error::CasaError;
use casa_core::listing::Listing;
use casa_core::search::Diagnostics;
use casa_core::service::PropertyService;
use casa_core::store::{StateStore, StateWatcher};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// First message of every transcript.
pub const CHAT_GREETING: &str = "Hello! I'm your AI real estate assistant. I can help you find properties using natural language. Try asking 'Find me a modern apartment in Zurich' or 'Show me 3 bedroom houses near the lake'.";

/// Shown in place of a reply when a turn fails.
pub const CHAT_FAILURE_NOTICE: &str =
    "Sorry, I encountered an error processing your request. Please try again.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatSession {
    pub session_id: String,
    pub transcript: Vec<ChatMessage>,
    pub status: RequestStatus,
    pub closed: bool,
    pub generation: u64,
}

impl ChatSession {
    fn open() -> Self {
        Self {
            session_id: new_session_id(),
            transcript: vec![ChatMessage::model(CHAT_GREETING)],
            status: RequestStatus::Idle,
            closed: false,
            generation: 0,
        }
    }

    /// Whether the "thinking" entry is currently shown.
    pub fn is_thinking(&self) -> bool {
        self.transcript.iter().any(|m| m.placeholder)
    }
}

/// What happened to a [`ChatController::send_message`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    Rejected(Rejection),
    Replied {
        listings: usize,
        /// Results were handed to the search controller.
        forwarded: bool,
    },
    Failed(CasaError),
    /// The panel closed before the reply arrived.
    Discarded,
}

pub struct ChatController {
    service: Arc<dyn PropertyService>,
    search: Option<Arc<SearchController>>,
    state: StateStore<ChatSession>,
}

impl ChatController {
    /// Opens a panel with a fresh session id and the greeting.
    ///
    /// When `search` is given, listings found by the agent's search tool are
    /// forwarded to it.
    pub fn open(service: Arc<dyn PropertyService>, search: Option<Arc<SearchController>>) -> Self {
        let session = ChatSession::open();
        tracing::debug!("Opened chat session {}", session.session_id);
        Self {
            service,
            search,
            state: StateStore::new(session),
        }
    }

    pub fn session_id(&self) -> String {
        self.state.read(|s| s.session_id.clone())
    }

    pub fn snapshot(&self) -> ChatSession {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> StateWatcher<ChatSession> {
        self.state.subscribe()
    }

    /// Sends one user turn.
    ///
    /// The user message and a "thinking" placeholder are appended before the
    /// call. When the reply arrives the placeholder is removed and the
    /// agent's message (or a failure notice) is appended.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        if text.trim().is_empty() {
            return SendOutcome::Rejected(Rejection::Blank);
        }

        let mut ticket = Err(Rejection::InFlight);
        self.state.update_if(|s| {
            if s.closed {
                ticket = Err(Rejection::Inactive);
                return false;
            }
            if s.status.is_pending() {
                return false;
            }
            s.transcript.push(ChatMessage::user(text));
            s.transcript.push(ChatMessage::thinking());
            s.status = RequestStatus::Pending;
            ticket = Ok((s.session_id.clone(), s.generation));
            true
        });
        let (session_id, generation) = match ticket {
            Ok(ticket) => ticket,
            Err(rejection) => return SendOutcome::Rejected(rejection),
        };

        tracing::debug!("Chat turn in session {}", session_id);
        let result = self.service.chat_turn(&session_id, text).await;

        let (message, outcome, forward) = match result {
            Ok(reply) => {
                let extracted = reply.extract();
                let forward = self.forwardable(&reply, &extracted.listings, text);
                let outcome = SendOutcome::Replied {
                    listings: extracted.listings.len(),
                    forwarded: forward.is_some(),
                };
                (
                    ChatMessage::model_with_listings(extracted.text, extracted.listings),
                    outcome,
                    forward,
                )
            }
            Err(err) => {
                tracing::error!("Chat turn failed: {}", err);
                (
                    ChatMessage::model(CHAT_FAILURE_NOTICE),
                    SendOutcome::Failed(err),
                    None,
                )
            }
        };

        let applied = self.state.update_if(|s| {
            if s.generation != generation {
                return false;
            }
            s.transcript.retain(|m| !m.placeholder);
            s.status = if matches!(outcome, SendOutcome::Failed(_)) {
                RequestStatus::Error
            } else {
                RequestStatus::Success
            };
            s.transcript.push(message);
            true
        });
        if !applied {
            tracing::warn!("Discarding chat reply for closed session {}", session_id);
            return SendOutcome::Discarded;
        }

        if let (Some(search), Some(result)) = (&self.search, forward) {
            search.receive_external_result(result);
        }
        outcome
    }

    /// Ends the panel's lifetime. Replies still in flight are dropped.
    pub fn close(&self) {
        self.state.update(|s| {
            s.closed = true;
            s.transcript.retain(|m| !m.placeholder);
            s.status = RequestStatus::Idle;
            s.generation += 1;
        });
        tracing::debug!("Closed chat session {}", self.session_id());
    }

    fn forwardable(
        &self,
        reply: &ChatReply,
        listings: &[Listing],
        typed: &str,
    ) -> Option<ExternalResult> {
        self.search.as_ref()?;
        let details = reply.tool_details.as_ref()?;
        Some(ExternalResult {
            listings: listings.to_vec(),
            used_query: Some(reply.used_prompt.clone().unwrap_or_else(|| typed.to_string())),
            diagnostics: Diagnostics::from_details(details),
            details: Some(details.clone()),
        })
    }
}

fn new_session_id() -> String {
    format!("session-{}", Uuid::new_v4().simple())
}
