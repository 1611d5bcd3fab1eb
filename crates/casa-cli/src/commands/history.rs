use anyhow::{Context, Result, bail};
use casa_application::{HistoryBrowser, QueryOutcome};
use casa_core::history::{FilterOperator, HistoryFilter, JoinOperator};
use casa_interaction::HttpPropertyService;
use std::sync::Arc;

use super::render;

pub async fn run(gateway: Arc<HttpPropertyService>, filters: &[String], expand: bool) -> Result<()> {
    let filters = filters
        .iter()
        .map(|raw| parse_filter(raw))
        .collect::<Result<Vec<_>>>()?;

    let browser = HistoryBrowser::new(gateway);
    browser.set_filters(filters);
    println!("📜 Fetching history...");

    let outcome = browser.on_activate().await;
    if expand {
        let rows = browser.snapshot().rows.len();
        for index in 0..rows {
            browser.toggle_row(index);
        }
    }
    render::history_view(&browser.snapshot());
    browser.on_deactivate();

    match outcome {
        QueryOutcome::Loaded(_) => Ok(()),
        QueryOutcome::Failed(err) => Err(err.into()),
        QueryOutcome::Rejected(_) | QueryOutcome::Discarded => bail!("History query did not run"),
    }
}

/// Parses `COLUMN:OP:VALUE[:AND|OR]`. The value may itself contain `:`; a
/// trailing `:AND` or `:OR` is read as the join.
pub fn parse_filter(raw: &str) -> Result<HistoryFilter> {
    let mut parts = raw.splitn(3, ':');
    let (Some(column), Some(operator), Some(rest)) = (parts.next(), parts.next(), parts.next())
    else {
        bail!("Filter '{}' must look like COLUMN:OP:VALUE[:AND|OR]", raw);
    };
    if column.trim().is_empty() {
        bail!("Filter '{}' has no column", raw);
    }

    let operator: FilterOperator = operator
        .trim()
        .parse()
        .with_context(|| format!("Unknown operator '{operator}' (use equals, not_equals or contains)"))?;

    let (value, join) = match rest.rsplit_once(':') {
        Some((value, join)) => match join.parse::<JoinOperator>() {
            Ok(join) => (value, join),
            Err(_) => (rest, JoinOperator::default()),
        },
        None => (rest, JoinOperator::default()),
    };

    let column = match column.trim().parse() {
        Ok(column) => column,
        Err(never) => match never {},
    };
    Ok(HistoryFilter::new(column, operator, value).joined_with(join))
}
