use serde::{Deserialize, Serialize};

/// Lifecycle of the one request a controller may have in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

impl RequestStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Why a controller refused to start an operation. A rejected call leaves
/// state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Input was empty after trimming.
    Blank,
    /// An operation of the same kind is still pending.
    InFlight,
    /// The owning panel has been closed or deactivated.
    Inactive,
}
