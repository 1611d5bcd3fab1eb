use anyhow::Result;
use casa_application::{EnrichmentController, ImageRequestOutcome};
use casa_core::listing::Listing;
use casa_interaction::HttpPropertyService;
use std::sync::Arc;

use super::render;

pub async fn run(gateway: Arc<HttpPropertyService>, description: String) -> Result<()> {
    println!("🎨 Generating image...");

    let listing = Listing {
        description,
        ..Default::default()
    };
    let enrichment = EnrichmentController::new(gateway.clone());

    match enrichment.request_image(&listing.display_key(0), &listing).await {
        ImageRequestOutcome::Ready(image_ref) => {
            render::image(&image_ref, &gateway);
            Ok(())
        }
        ImageRequestOutcome::Failed(err) => {
            eprintln!("❌ {}", err.user_message());
            Err(err.into())
        }
        ImageRequestOutcome::Skipped(state) => {
            anyhow::bail!("Image request skipped: {}", render::image_state(&state))
        }
    }
}
