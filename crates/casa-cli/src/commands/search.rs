use anyhow::{Result, bail};
use casa_application::{SearchController, SubmitOutcome};
use casa_core::search::SearchMode;
use casa_core::search::examples::{example_by_id, find_example};
use casa_interaction::HttpPropertyService;
use std::sync::Arc;

use super::render;

pub async fn run(
    gateway: Arc<HttpPropertyService>,
    mode: SearchMode,
    query: Option<String>,
    example_id: Option<&str>,
) -> Result<()> {
    let query = match (query, example_id) {
        (Some(query), _) => query,
        (None, Some(id)) => match example_by_id(id) {
            Some(example) => example.query.to_string(),
            None => bail!("Unknown example '{}'", id),
        },
        (None, None) => bail!("Provide a query or --example"),
    };

    println!("🔍 {} · {}", mode.label(), mode.description());
    println!("   \"{}\"", query);

    let search = SearchController::with_mode(gateway.clone(), mode);
    let outcome = search.submit(&query).await;
    render::search_session(&search.snapshot(), &gateway);

    if let Some(example) = find_example(&query) {
        render::example(example);
    }

    match outcome {
        SubmitOutcome::Completed(_) => Ok(()),
        SubmitOutcome::Rejected(_) => bail!("Query must not be empty"),
        SubmitOutcome::Failed(err) => Err(err.into()),
        SubmitOutcome::Discarded => bail!("Search was superseded"),
    }
}
