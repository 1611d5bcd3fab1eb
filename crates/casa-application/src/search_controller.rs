//! Search session controller.
//!
//! Drives `Idle → Pending → Success | Error` for direct searches and accepts
//! results produced elsewhere (the chat agent) through
//! [`SearchController::receive_external_result`].
//!
//! Every operation that replaces the visible result set bumps
//! [`SearchSession::generation`]. A response is applied only if the
//! generation it was issued under is still current, so a slow answer can
//! never overwrite a newer state.

use crate::status::{Rejection, RequestStatus};
use casa_core::error::CasaError;
use casa_core::listing::Listing;
use casa_core::search::{Diagnostics, SearchMode, SearchOutcome};
use casa_core::service::PropertyService;
use casa_core::store::{StateStore, StateWatcher};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// View state of the search surface.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SearchSession {
    pub query: String,
    pub mode: SearchMode,
    pub results: Vec<Listing>,
    pub diagnostics: Diagnostics,
    /// Cities the backend suggests when nothing matched.
    pub available_cities: Vec<String>,
    /// Raw details object of the last result, when the backend sent one.
    pub details: Option<Value>,
    pub status: RequestStatus,
    pub error_message: Option<String>,
    pub generation: u64,
}

impl SearchSession {
    fn with_mode(mode: SearchMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// A search ran, succeeded and found nothing.
    pub fn is_no_match(&self) -> bool {
        self.status == RequestStatus::Success && self.results.is_empty()
    }

    /// Cities to offer after a search that produced a query but no listings.
    pub fn city_suggestions(&self) -> &[String] {
        if self.is_no_match() && self.diagnostics.generated_query.is_some() {
            &self.available_cities
        } else {
            &[]
        }
    }

    fn reset_results(&mut self) {
        self.results.clear();
        self.diagnostics = Diagnostics::default();
        self.available_cities.clear();
        self.details = None;
        self.error_message = None;
    }
}

/// What happened to a [`SearchController::submit`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Rejected(Rejection),
    /// Results were applied; carries the listing count.
    Completed(usize),
    /// The error was applied to the session.
    Failed(CasaError),
    /// The response arrived after the session moved on and was dropped.
    Discarded,
}

/// Listings produced outside a direct search, e.g. by the chat agent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExternalResult {
    pub listings: Vec<Listing>,
    /// Query the results answer; replaces the query text when present.
    pub used_query: Option<String>,
    pub diagnostics: Diagnostics,
    pub details: Option<Value>,
}

pub struct SearchController {
    service: Arc<dyn PropertyService>,
    state: StateStore<SearchSession>,
}

impl SearchController {
    pub fn new(service: Arc<dyn PropertyService>) -> Self {
        Self::with_mode(service, SearchMode::default())
    }

    pub fn with_mode(service: Arc<dyn PropertyService>, mode: SearchMode) -> Self {
        Self {
            service,
            state: StateStore::new(SearchSession::with_mode(mode)),
        }
    }

    pub fn snapshot(&self) -> SearchSession {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> StateWatcher<SearchSession> {
        self.state.subscribe()
    }

    /// Updates the query text as the user types. Does not search.
    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        self.state.update_if(|s| {
            if s.query == query {
                return false;
            }
            s.query = query;
            true
        });
    }

    /// Selects the search mode used by the next submit.
    pub fn set_mode(&self, mode: SearchMode) {
        self.state.update_if(|s| {
            if s.mode == mode {
                return false;
            }
            s.mode = mode;
            true
        });
    }

    /// Submits the current query text.
    pub async fn submit_current(&self) -> SubmitOutcome {
        let query = self.state.read(|s| s.query.clone());
        self.submit(&query).await
    }

    /// Runs a search for one of the suggested cities.
    pub async fn search_city(&self, city: &str) -> SubmitOutcome {
        self.submit(city).await
    }

    /// Starts a search for `query`.
    ///
    /// Rejected without touching state when `query` is blank or a search is
    /// already pending. Otherwise previous results are cleared, the session
    /// goes `Pending`, and the response is applied unless the session was
    /// cleared or superseded meanwhile.
    pub async fn submit(&self, query: &str) -> SubmitOutcome {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return SubmitOutcome::Rejected(Rejection::Blank);
        }

        let mut ticket = None;
        self.state.update_if(|s| {
            if s.status.is_pending() {
                return false;
            }
            s.query = query.to_string();
            s.reset_results();
            s.status = RequestStatus::Pending;
            s.generation += 1;
            ticket = Some((s.generation, s.mode));
            true
        });
        let Some((generation, mode)) = ticket else {
            tracing::debug!("Search rejected: another search is pending");
            return SubmitOutcome::Rejected(Rejection::InFlight);
        };

        tracing::debug!("Searching ({}) for '{}'", mode, trimmed);
        let result = self.service.search(trimmed, Some(mode)).await;

        let mut outcome = SubmitOutcome::Discarded;
        self.state.update_if(|s| {
            if s.generation != generation {
                return false;
            }
            outcome = match result {
                Ok(found) => apply_outcome(s, found),
                Err(err) => {
                    tracing::error!("Search failed: {}", err);
                    s.status = RequestStatus::Error;
                    s.error_message = Some(err.user_message());
                    SubmitOutcome::Failed(err)
                }
            };
            true
        });

        if outcome == SubmitOutcome::Discarded {
            tracing::warn!(
                "Discarding stale search response for '{}' (generation {})",
                trimmed,
                generation
            );
        }
        outcome
    }

    /// Applies results obtained through another path.
    ///
    /// Goes straight to `Success` without passing through `Pending`, and
    /// supersedes any direct search still in flight.
    pub fn receive_external_result(&self, result: ExternalResult) {
        tracing::debug!(
            "Receiving {} external listings",
            result.listings.len()
        );
        self.state.update(|s| {
            s.reset_results();
            if let Some(query) = result.used_query.filter(|q| !q.trim().is_empty()) {
                s.query = query;
            }
            s.results = result.listings;
            s.diagnostics = result.diagnostics;
            s.details = result.details;
            s.status = RequestStatus::Success;
            s.generation += 1;
        });
    }

    /// Resets query, results, diagnostics and error from any state. The
    /// selected mode is kept.
    pub fn clear(&self) {
        self.state.update(|s| {
            s.query.clear();
            s.reset_results();
            s.status = RequestStatus::Idle;
            s.generation += 1;
        });
    }
}

fn apply_outcome(session: &mut SearchSession, found: SearchOutcome) -> SubmitOutcome {
    let count = found.listings.len();
    session.results = found.listings;
    session.diagnostics = found.diagnostics;
    session.available_cities = found.available_cities;
    session.details = found.details;
    session.status = RequestStatus::Success;
    tracing::debug!("Search completed with {} listings", count);
    SubmitOutcome::Completed(count)
}
