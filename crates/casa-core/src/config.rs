use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::search::SearchMode;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Which generation of the backend contract the client talks to.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApiVariant {
    /// Search endpoint takes an explicit `mode`.
    #[default]
    Legacy,
    /// Search is always natural-language-to-SQL; `mode` is not sent.
    Unified,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Root URL the API paths are resolved against.
    pub base_url: String,
    /// Whole-request timeout; a timeout is reported as a network error.
    pub request_timeout_secs: u64,
    pub api_variant: ApiVariant,
    pub default_mode: SearchMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_variant: ApiVariant::default(),
            default_mode: SearchMode::default(),
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
