use anyhow::Result;
use casa_core::search::SearchMode;
use casa_infrastructure::{ConfigOverrides, ConfigService};
use casa_interaction::HttpPropertyService;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "casa")]
#[command(about = "CASA - Conversational Apartment Search Assistant", long_about = None)]
struct Cli {
    /// Backend URL; overrides the config file and CASA_BASE_URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Config file to read instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search listings with a natural-language query
    Search {
        query: Vec<String>,

        /// nl2sql, semantic, visual or vertex_search
        #[arg(long)]
        mode: Option<SearchMode>,

        /// Run one of the curated examples (hybrid, business, vibe)
        #[arg(long, value_name = "ID", conflicts_with = "query")]
        example: Option<String>,
    },
    /// Talk to the real estate assistant
    Chat,
    /// Browse the prompt history
    History {
        /// COLUMN:OP:VALUE[:AND|OR], OP is equals, not_equals or contains
        #[arg(long = "filter", value_name = "FILTER")]
        filters: Vec<String>,

        /// Show explanations under each row
        #[arg(long)]
        expand: bool,
    },
    /// Generate an image from a description
    Image { description: Vec<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,casa=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_service = match &cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new()?,
    };
    let config = config_service.load(&ConfigOverrides {
        base_url: cli.base_url.clone(),
        request_timeout_secs: None,
    })?;
    tracing::debug!("Using backend {}", config.base_url);

    let gateway = Arc::new(HttpPropertyService::from_config(&config)?);

    match cli.command {
        Commands::Search {
            query,
            mode,
            example,
        } => {
            let query = (!query.is_empty()).then(|| query.join(" "));
            let mode = mode.unwrap_or(config.default_mode);
            commands::search::run(gateway, mode, query, example.as_deref()).await?
        }
        Commands::Chat => commands::chat::run(gateway).await?,
        Commands::History { filters, expand } => {
            commands::history::run(gateway, &filters, expand).await?
        }
        Commands::Image { description } => {
            if description.is_empty() {
                anyhow::bail!("Provide a description");
            }
            commands::image::run(gateway, description.join(" ")).await?
        }
    }

    Ok(())
}
