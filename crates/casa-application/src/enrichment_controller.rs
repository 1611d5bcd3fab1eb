//! Per-listing image generation.
//!
//! Each listing is tracked under its display key and moves through
//! [`ImageGenerationState`] on its own; a slow generation for one listing
//! never holds up another.
//!
//! Id-less listings are keyed by position, so states only make sense for the
//! result set they were created under. [`EnrichmentController::follow_result_set`]
//! forgets them when the results change.

use casa_core::error::CasaError;
use casa_core::image::ImageGenerationState;
use casa_core::listing::Listing;
use casa_core::service::PropertyService;
use casa_core::store::{StateStore, StateWatcher};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Generation state of every listing that was asked about, by display key.
pub type ImageStates = BTreeMap<String, ImageGenerationState>;

/// What happened to a [`EnrichmentController::request_image`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageRequestOutcome {
    /// The listing was not `NotRequested`; carries the state it is in.
    Skipped(ImageGenerationState),
    Ready(String),
    Failed(CasaError),
}

pub struct EnrichmentController {
    service: Arc<dyn PropertyService>,
    states: StateStore<ImageStates>,
    /// Bumped on every reset; completions from an older epoch are dropped.
    epoch: AtomicU64,
    result_set: AtomicU64,
}

impl EnrichmentController {
    pub fn new(service: Arc<dyn PropertyService>) -> Self {
        Self {
            service,
            states: StateStore::default(),
            epoch: AtomicU64::new(0),
            result_set: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> ImageStates {
        self.states.snapshot()
    }

    pub fn subscribe(&self) -> StateWatcher<ImageStates> {
        self.states.subscribe()
    }

    /// Current state for `key`. A listing never asked about is `NotRequested`.
    pub fn state_of(&self, key: &str) -> ImageGenerationState {
        self.states.read(|states| states.get(key).cloned().unwrap_or_default())
    }

    /// Image to render for a listing: its own, or one generated for it.
    pub fn image_for(&self, key: &str, listing: &Listing) -> Option<String> {
        listing.image_ref.clone().or_else(|| {
            self.states
                .read(|states| states.get(key).and_then(|s| s.image_ref().map(str::to_string)))
        })
    }

    /// Generates an image from the listing's description.
    ///
    /// Only a listing in `NotRequested` starts a call; every other state is
    /// left as it is. A listing that already carries an image is recorded as
    /// `Ready` with that image and never generated.
    pub async fn request_image(&self, key: &str, listing: &Listing) -> ImageRequestOutcome {
        let mut skipped = None;
        let mut epoch = 0;
        self.states.update_if(|states| {
            epoch = self.epoch.load(Ordering::SeqCst);
            let current = states.get(key).cloned().unwrap_or_else(|| match &listing.image_ref {
                Some(image_ref) => ImageGenerationState::Ready(image_ref.clone()),
                None => ImageGenerationState::NotRequested,
            });
            if current != ImageGenerationState::NotRequested {
                let recorded = states.contains_key(key);
                if !recorded {
                    states.insert(key.to_string(), current.clone());
                }
                skipped = Some(current);
                return !recorded;
            }
            states.insert(key.to_string(), ImageGenerationState::Pending);
            true
        });
        if let Some(state) = skipped {
            tracing::debug!("Image request for {} skipped in state {:?}", key, state);
            return ImageRequestOutcome::Skipped(state);
        }

        tracing::debug!("Generating image for {}", key);
        let (state, outcome) = match self.service.generate_image(&listing.description).await {
            Ok(image) => (
                ImageGenerationState::Ready(image.image_ref.clone()),
                ImageRequestOutcome::Ready(image.image_ref),
            ),
            Err(err) => {
                tracing::error!("Image generation for {} failed: {}", key, err);
                (
                    ImageGenerationState::Failed(err.user_message()),
                    ImageRequestOutcome::Failed(err),
                )
            }
        };
        let applied = self.states.update_if(|states| {
            if self.epoch.load(Ordering::SeqCst) != epoch {
                return false;
            }
            states.insert(key.to_string(), state);
            true
        });
        if !applied {
            tracing::debug!("Dropping image for {} generated before a reset", key);
        }
        outcome
    }

    /// Forgets every listing's state. Generations still in flight finish but
    /// are not recorded.
    pub fn reset(&self) {
        self.states.update(|states| {
            self.epoch.fetch_add(1, Ordering::SeqCst);
            states.clear();
        });
    }

    /// Resets when `result_set` differs from the one seen last, typically
    /// [`SearchSession::generation`](crate::SearchSession::generation).
    ///
    /// Returns `true` when the states were reset.
    pub fn follow_result_set(&self, result_set: u64) -> bool {
        if self.result_set.swap(result_set, Ordering::SeqCst) == result_set {
            return false;
        }
        self.reset();
        true
    }

    /// Moves a failed listing back to `NotRequested` so it can be retried.
    ///
    /// Returns `false` when the listing was not `Failed`.
    pub fn rearm(&self, key: &str) -> bool {
        self.states.update_if(|states| match states.get(key) {
            Some(ImageGenerationState::Failed(_)) => {
                states.remove(key);
                true
            }
            _ => false,
        })
    }
}
