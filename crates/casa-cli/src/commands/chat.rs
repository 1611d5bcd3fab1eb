use anyhow::{Context, Result};
use casa_application::{
    ChatController, EnrichmentController, ImageRequestOutcome, SearchController, SendOutcome,
};
use casa_interaction::HttpPropertyService;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::render;

const HELP: &str = "Commands: /image <n> visualizes result n, /results shows the current results, /quit leaves.";

pub async fn run(gateway: Arc<HttpPropertyService>) -> Result<()> {
    let search = Arc::new(SearchController::new(gateway.clone()));
    let chat = ChatController::open(gateway.clone(), Some(search.clone()));
    let enrichment = EnrichmentController::new(gateway.clone());

    tracing::info!("Chat session {}", chat.session_id());
    for message in chat.snapshot().transcript {
        render::chat_message(&message);
    }
    println!("\n{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n> ");
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };
        let line = line.trim();

        match line.split_once(' ').map_or((line, ""), |(cmd, rest)| (cmd, rest.trim())) {
            ("/quit" | "/exit", _) => break,
            ("/results", _) => {
                let session = search.snapshot();
                enrichment.follow_result_set(session.generation);
                render::listings(&session.results, &gateway, Some(&enrichment.snapshot()));
            }
            ("/image", arg) => {
                let session = search.snapshot();
                enrichment.follow_result_set(session.generation);
                let results = session.results;
                let Some((position, listing)) = arg
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| results.get(i).map(|l| (i, l)))
                else {
                    println!("No result '{arg}'. {HELP}");
                    continue;
                };
                println!("🎨 Generating image for {}...", listing.title);
                match enrichment.request_image(&listing.display_key(position), listing).await {
                    ImageRequestOutcome::Ready(image_ref) => render::image(&image_ref, &gateway),
                    ImageRequestOutcome::Failed(err) => eprintln!("❌ {}", err.user_message()),
                    ImageRequestOutcome::Skipped(state) => {
                        println!("ℹ️  Image {}", render::image_state(&state));
                    }
                }
            }
            _ => {
                match chat.send_message(line).await {
                    SendOutcome::Rejected(_) | SendOutcome::Discarded => continue,
                    SendOutcome::Replied { forwarded, .. } => {
                        if let Some(reply) = chat.snapshot().transcript.last() {
                            render::chat_message(reply);
                        }
                        if forwarded {
                            render::search_session(&search.snapshot(), &gateway);
                        }
                    }
                    SendOutcome::Failed(_) => {
                        if let Some(reply) = chat.snapshot().transcript.last() {
                            render::chat_message(reply);
                        }
                    }
                }
            }
        }
    }

    chat.close();
    Ok(())
}
