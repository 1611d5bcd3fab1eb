//! Domain layer of the Casa property-search client.
//!
//! Holds the data model shared by every crate, the [`PropertyService`]
//! contract the remote gateway implements, and the pure pieces of logic that
//! need no I/O: properties-block extraction, history predicate assembly and
//! image reference normalization.

pub mod chat;
pub mod config;
pub mod error;
pub mod history;
pub mod image;
pub mod listing;
pub mod search;
pub mod service;
pub mod store;

// Re-export common types
pub use error::{CasaError, Result};
pub use listing::{Listing, ListingId};
pub use service::PropertyService;
pub use store::{StateStore, StateWatcher};
