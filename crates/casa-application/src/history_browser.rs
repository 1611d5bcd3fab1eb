//! History browser: filter rows, server-side filtering and table state.

use crate::status::{Rejection, RequestStatus};
use casa_core::error::CasaError;
use casa_core::history::{HISTORY_ROW_LIMIT, HistoryFilter, HistoryRow, assemble_predicate};
use casa_core::service::PropertyService;
use casa_core::store::{StateStore, StateWatcher};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Shown when a history query fails.
pub const HISTORY_FAILURE_NOTICE: &str = "Failed to fetch history";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryView {
    /// Editable filter rows. Never empty.
    pub filters: Vec<HistoryFilter>,
    pub rows: Vec<HistoryRow>,
    /// Predicate the current rows were fetched with.
    pub applied_predicate: String,
    pub status: RequestStatus,
    pub error_message: Option<String>,
    /// Indices into `rows` whose details are shown.
    pub expanded_rows: BTreeSet<usize>,
    pub active: bool,
    pub generation: u64,
}

impl Default for HistoryView {
    fn default() -> Self {
        Self {
            filters: vec![HistoryFilter::default()],
            rows: Vec::new(),
            applied_predicate: String::new(),
            status: RequestStatus::Idle,
            error_message: None,
            expanded_rows: BTreeSet::new(),
            active: false,
            generation: 0,
        }
    }
}

impl HistoryView {
    /// Predicate built from the filter rows as they are now.
    pub fn predicate(&self) -> String {
        assemble_predicate(&self.filters)
    }

    /// The backend returned as many rows as it ever will.
    pub fn is_capped(&self) -> bool {
        self.rows.len() >= HISTORY_ROW_LIMIT
    }

    pub fn row_limit_notice() -> String {
        format!("Showing up to {HISTORY_ROW_LIMIT} rows")
    }
}

/// What happened to a history fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Rejected(Rejection),
    Loaded(usize),
    Failed(CasaError),
    /// The browser was deactivated before the rows arrived.
    Discarded,
}

pub struct HistoryBrowser {
    service: Arc<dyn PropertyService>,
    state: StateStore<HistoryView>,
}

impl HistoryBrowser {
    pub fn new(service: Arc<dyn PropertyService>) -> Self {
        Self {
            service,
            state: StateStore::default(),
        }
    }

    pub fn snapshot(&self) -> HistoryView {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> StateWatcher<HistoryView> {
        self.state.subscribe()
    }

    pub fn predicate(&self) -> String {
        self.state.read(HistoryView::predicate)
    }

    /// Called by the shell when the browser becomes visible. Fetches with the
    /// current filters.
    pub async fn on_activate(&self) -> QueryOutcome {
        self.state.update_if(|s| {
            if s.active {
                return false;
            }
            s.active = true;
            true
        });
        self.run_query().await
    }

    /// Called by the shell when the browser is hidden. A fetch still in
    /// flight is discarded when it returns.
    pub fn on_deactivate(&self) {
        self.state.update(|s| {
            s.active = false;
            if s.status.is_pending() {
                s.status = RequestStatus::Idle;
            }
            s.generation += 1;
        });
    }

    /// Fetches the rows matching the current filters.
    pub async fn run_query(&self) -> QueryOutcome {
        let mut ticket = Err(Rejection::InFlight);
        self.state.update_if(|s| {
            if !s.active {
                ticket = Err(Rejection::Inactive);
                return false;
            }
            if s.status.is_pending() {
                return false;
            }
            s.status = RequestStatus::Pending;
            s.error_message = None;
            s.generation += 1;
            ticket = Ok((s.predicate(), s.generation));
            true
        });
        let (predicate, generation) = match ticket {
            Ok(ticket) => ticket,
            Err(rejection) => return QueryOutcome::Rejected(rejection),
        };

        tracing::debug!("Querying history with '{}'", predicate);
        let result = self.service.query_history(&predicate).await;

        let mut outcome = QueryOutcome::Discarded;
        self.state.update_if(|s| {
            if s.generation != generation {
                return false;
            }
            outcome = match result {
                Ok(rows) => {
                    let count = rows.len();
                    s.rows = rows;
                    s.applied_predicate = predicate;
                    s.expanded_rows.clear();
                    s.status = RequestStatus::Success;
                    QueryOutcome::Loaded(count)
                }
                Err(err) => {
                    tracing::error!("History query failed: {}", err);
                    s.status = RequestStatus::Error;
                    s.error_message = Some(HISTORY_FAILURE_NOTICE.to_string());
                    QueryOutcome::Failed(err)
                }
            };
            true
        });
        if outcome == QueryOutcome::Discarded {
            tracing::warn!("Discarding history rows fetched for an inactive browser");
        }
        outcome
    }

    /// Appends a row: `user_prompt contains ''`, joined with `AND`.
    pub fn add_filter(&self) {
        self.state.update(|s| s.filters.push(HistoryFilter::default()));
    }

    /// Removes a filter row. Removing the last row leaves one default row.
    pub fn remove_filter(&self, index: usize) -> bool {
        self.state.update_if(|s| {
            if index >= s.filters.len() {
                return false;
            }
            s.filters.remove(index);
            if s.filters.is_empty() {
                s.filters.push(HistoryFilter::default());
            }
            true
        })
    }

    pub fn update_filter(&self, index: usize, edit: impl FnOnce(&mut HistoryFilter)) -> bool {
        self.state.update_if(|s| match s.filters.get_mut(index) {
            Some(filter) => {
                edit(filter);
                true
            }
            None => false,
        })
    }

    /// Replaces every filter row at once.
    pub fn set_filters(&self, filters: Vec<HistoryFilter>) {
        self.state.update(|s| {
            s.filters = if filters.is_empty() {
                vec![HistoryFilter::default()]
            } else {
                filters
            };
        });
    }

    /// Expands or collapses one row. Returns whether it is now expanded.
    pub fn toggle_row(&self, index: usize) -> bool {
        self.state.update(|s| {
            if s.expanded_rows.remove(&index) {
                false
            } else {
                s.expanded_rows.insert(index);
                true
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockPropertyService, history_row};
    use casa_core::history::{FilterOperator, HistoryColumn, JoinOperator};

    #[test]
    fn test_starts_with_one_default_filter() {
        let browser = HistoryBrowser::new(Arc::new(MockPropertyService::new()));
        let view = browser.snapshot();
        assert_eq!(view.filters.len(), 1);
        assert_eq!(view.filters[0].column, HistoryColumn::UserPrompt);
        assert_eq!(view.filters[0].operator, FilterOperator::Contains);
        assert!(view.filters[0].value.is_empty());
        assert_eq!(browser.predicate(), "");
    }

    #[test]
    fn test_filter_editing() {
        let browser = HistoryBrowser::new(Arc::new(MockPropertyService::new()));
        assert!(browser.update_filter(0, |f| f.value = "Geneva".into()));
        browser.add_filter();
        assert!(browser.update_filter(1, |f| {
            f.column = HistoryColumn::QueryTemplateUsed;
            f.operator = FilterOperator::Equals;
            f.value = "true".into();
            f.join = JoinOperator::Or;
        }));
        assert!(!browser.update_filter(5, |f| f.value = "x".into()));

        assert_eq!(
            browser.predicate(),
            "user_prompt ILIKE '%Geneva%' OR query_template_used = 'true'"
        );

        assert!(browser.remove_filter(0));
        assert_eq!(browser.predicate(), "query_template_used = 'true'");
        assert!(!browser.remove_filter(3));
    }

    #[test]
    fn test_removing_last_filter_resets_to_default() {
        let browser = HistoryBrowser::new(Arc::new(MockPropertyService::new()));
        browser.update_filter(0, |f| f.value = "loft".into());
        assert!(browser.remove_filter(0));
        assert_eq!(browser.snapshot().filters, vec![HistoryFilter::default()]);
    }

    #[tokio::test]
    async fn test_activate_fetches_with_current_predicate() {
        let service = Arc::new(MockPropertyService::new());
        service.push_history(Ok(vec![history_row("lofts"), history_row("villas")]));
        let browser = HistoryBrowser::new(service.clone());
        browser.update_filter(0, |f| f.value = "it's".into());

        assert_eq!(browser.on_activate().await, QueryOutcome::Loaded(2));
        assert_eq!(
            service.last_where_clause().as_deref(),
            Some("user_prompt ILIKE '%it''s%'")
        );
        let view = browser.snapshot();
        assert!(view.active);
        assert_eq!(view.status, RequestStatus::Success);
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.applied_predicate, "user_prompt ILIKE '%it''s%'");
        assert!(!view.is_capped());
    }

    #[tokio::test]
    async fn test_query_requires_active_browser() {
        let service = Arc::new(MockPropertyService::new());
        let browser = HistoryBrowser::new(service.clone());
        assert_eq!(browser.run_query().await, QueryOutcome::Rejected(Rejection::Inactive));
        assert_eq!(service.history_calls(), 0);
    }

    #[tokio::test]
    async fn test_failure_sets_notice() {
        let service = Arc::new(MockPropertyService::new());
        service.push_history(Err(CasaError::service(Some(400), "bad column")));
        let browser = HistoryBrowser::new(service);

        assert!(matches!(browser.on_activate().await, QueryOutcome::Failed(_)));
        let view = browser.snapshot();
        assert_eq!(view.status, RequestStatus::Error);
        assert_eq!(view.error_message.as_deref(), Some(HISTORY_FAILURE_NOTICE));
    }

    #[tokio::test]
    async fn test_deactivate_discards_in_flight_rows() {
        let service = Arc::new(MockPropertyService::gated());
        service.push_history(Ok(vec![history_row("lofts")]));
        let browser = Arc::new(HistoryBrowser::new(service.clone()));
        let mut watcher = browser.subscribe();

        let fetch = tokio::spawn({
            let browser = browser.clone();
            async move { browser.on_activate().await }
        });
        watcher.wait_for(|v| v.status.is_pending()).await.unwrap();

        browser.on_deactivate();
        service.release();

        assert_eq!(fetch.await.unwrap(), QueryOutcome::Discarded);
        let view = browser.snapshot();
        assert!(!view.active);
        assert_eq!(view.status, RequestStatus::Idle);
        assert!(view.rows.is_empty());
    }

    #[tokio::test]
    async fn test_toggle_rows_and_reset_on_refetch() {
        let service = Arc::new(MockPropertyService::new());
        service.push_history(Ok(vec![history_row("a"), history_row("b")]));
        service.push_history(Ok(vec![history_row("a")]));
        let browser = HistoryBrowser::new(service);
        browser.on_activate().await;

        assert!(browser.toggle_row(1));
        assert!(browser.snapshot().expanded_rows.contains(&1));
        assert!(!browser.toggle_row(1));
        assert!(browser.toggle_row(0));

        browser.run_query().await;
        assert!(browser.snapshot().expanded_rows.is_empty());
    }

    #[test]
    fn test_row_limit_notice() {
        assert_eq!(HistoryView::row_limit_notice(), "Showing up to 1000 rows");
    }
}
