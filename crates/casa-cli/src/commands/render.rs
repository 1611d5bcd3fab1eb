//! Plain-text rendering of controller state.

use casa_application::{HistoryView, ImageStates, RequestStatus, SearchSession};
use casa_core::chat::ChatMessage;
use casa_core::image::ImageGenerationState;
use casa_core::listing::Listing;
use casa_core::search::SearchExample;
use casa_interaction::HttpPropertyService;

pub fn search_session(session: &SearchSession, gateway: &HttpPropertyService) {
    if let Some(error) = &session.error_message {
        eprintln!("❌ {}", error);
        return;
    }
    if session.status != RequestStatus::Success {
        return;
    }

    let diagnostics = &session.diagnostics;
    if let Some(query) = &diagnostics.generated_query {
        println!("\n── System Output ──\n{}", query);
    }
    if let Some(explanation) = &diagnostics.explanation {
        println!("\n── Explanation ──\n{}", explanation);
    }
    if let Some(answer) = &diagnostics.natural_language_answer {
        println!("\n💬 {}", answer);
    }

    if session.results.is_empty() {
        println!("\nNo properties found matching your criteria.");
        let cities = session.city_suggestions();
        if !cities.is_empty() {
            println!("Try to search in one of these cities: {}", cities.join(", "));
        }
        return;
    }

    println!("\n🏠 {} properties", session.results.len());
    listings(&session.results, gateway, None);
}

pub fn listings(listings: &[Listing], gateway: &HttpPropertyService, images: Option<&ImageStates>) {
    for (position, listing) in listings.iter().enumerate() {
        let key = listing.display_key(position);
        let mut headline = format!("  [{}] {} · {}", position + 1, listing.title, listing.price_label());
        if let Some(beds) = listing.bedrooms_label() {
            headline.push_str(&format!(" · {beds}"));
        }
        println!("{headline}");

        let location = listing.location_label();
        if !location.is_empty() {
            println!("      📍 {location}");
        }

        let image = listing.image_ref.clone().or_else(|| {
            images
                .and_then(|states| states.get(&key))
                .and_then(|state| state.image_ref().map(str::to_string))
        });
        if let Some(image_ref) = image {
            print!("      ");
            self::image(&image_ref, gateway);
        }
    }
}

/// Prints a fetchable location for an image. Inline data URIs are abbreviated.
pub fn image(image_ref: &str, gateway: &HttpPropertyService) {
    if image_ref.starts_with("data:") {
        println!("🖼  generated image ({} bytes inline)", image_ref.len());
        return;
    }
    match gateway.resolve_image_url(image_ref) {
        Ok(url) => println!("🖼  {url}"),
        Err(_) => println!("🖼  {image_ref}"),
    }
}

/// Short description of where a listing's image generation stands.
pub fn image_state(state: &ImageGenerationState) -> &'static str {
    match state {
        ImageGenerationState::NotRequested => "not requested yet",
        ImageGenerationState::Pending => "generation in progress",
        ImageGenerationState::Ready(_) => "already generated",
        ImageGenerationState::Failed(_) => "generation failed earlier",
    }
}

pub fn chat_message(message: &ChatMessage) {
    println!("\n🤖 {}", message.text);
    if !message.listings.is_empty() {
        println!("   ({} properties attached)", message.listings.len());
    }
}

pub fn example(example: &SearchExample) {
    println!("\n✨ {}", example.title);
    println!("   Showcases: {}", example.showcases);
    for reason in example.reasons {
        println!("   • {}: {}", reason.label, reason.detail);
    }
}

pub fn history_view(view: &HistoryView) {
    if let Some(error) = &view.error_message {
        eprintln!("❌ {}", error);
        return;
    }

    if view.applied_predicate.is_empty() {
        println!("Filter: (none)");
    } else {
        println!("Filter: {}", view.applied_predicate);
    }
    println!("{} · {} rows\n", HistoryView::row_limit_notice(), view.rows.len());

    for (index, row) in view.rows.iter().enumerate() {
        println!(
            "{:>4}  {:<60}  template_used={}  template_id={}",
            index + 1,
            truncate(row.user_prompt.as_deref().unwrap_or("-"), 60),
            row.template_used_label(),
            row.template_id_label(),
        );
        if view.expanded_rows.contains(&index) {
            if let Some(explanation) = &row.query_explanation {
                println!("      {}", explanation);
            }
        }
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
