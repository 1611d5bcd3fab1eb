//! Image references and per-listing generation state.

use serde::{Deserialize, Serialize};

/// Path of the backend endpoint that serves objects from private storage.
pub const IMAGE_PROXY_PATH: &str = "/api/image";

const STORAGE_SCHEME: &str = "gs://";
const STORAGE_HOST: &str = "https://storage.googleapis.com/";

/// Rewrites raw storage references into the proxy form
/// `/api/image?gcs_uri=<percent-encoded>`.
///
/// Anything else (data URIs, already-proxied paths, public URLs) is returned
/// unchanged.
pub fn normalize_image_ref(image_ref: &str) -> String {
    if image_ref.starts_with(STORAGE_SCHEME) || image_ref.starts_with(STORAGE_HOST) {
        format!(
            "{IMAGE_PROXY_PATH}?gcs_uri={}",
            urlencoding::encode(image_ref)
        )
    } else {
        image_ref.to_string()
    }
}

/// Result of an on-demand image generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub image_ref: String,
}

/// Lifecycle of the "visualize" action for one listing.
///
/// `Ready` is terminal. `Failed` only returns to `NotRequested` when the UI
/// re-arms it explicitly, so a failing generation is never retried silently.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum ImageGenerationState {
    #[default]
    NotRequested,
    Pending,
    Ready(String),
    Failed(String),
}

impl ImageGenerationState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn image_ref(&self) -> Option<&str> {
        match self {
            Self::Ready(uri) => Some(uri),
            _ => None,
        }
    }

    /// Notice to show for a failed generation.
    pub fn notice(&self) -> Option<&str> {
        match self {
            Self::Failed(notice) => Some(notice),
            _ => None,
        }
    }
}
