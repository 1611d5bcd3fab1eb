//! Property search domain types.
//!
//! - `model`: search modes, search outcomes and their diagnostics
//! - `examples`: curated example queries offered next to the search box

pub mod examples;
pub mod model;

pub use examples::{ExampleReason, SearchExample};
pub use model::{Diagnostics, SearchMode, SearchOutcome};
