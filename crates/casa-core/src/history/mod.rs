//! Prompt history domain module.
//!
//! - `filter`: filter rows and the predicate fragment assembled from them
//! - `row`: one history record as returned by the backend

pub mod filter;
mod row;

pub use filter::{FilterOperator, HistoryColumn, HistoryFilter, JoinOperator, assemble_predicate};
pub use row::{HISTORY_ROW_LIMIT, HistoryRow};
