mod config;
mod kb;
mod lang;
mod llm;
mod pipeline;
mod state;
#[cfg(test)]
mod testutil;
mod transcript;
mod translate;

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, Level};

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    // Load env
    let _ = dotenv::dotenv();

    // Missing credential is the only fatal error: fail here, before any
    // query is accepted.
    let config = Config::from_env()?;
    info!(
        primary = %config.primary_model,
        backup = %config.backup_model,
        retries = config.gen_retries,
        "configuration loaded"
    );

    let state = AppState::new(&config)?;

    println!("HealthLingo — your AI health assistant.");
    println!("Ask about any disease, symptoms, or prevention. /clear resets the chat, /quit exits.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        match query {
            "/quit" | "/exit" => break,
            "/clear" => {
                state.transcript.clear().await;
                println!("(transcript cleared)");
                continue;
            }
            _ => {}
        }

        let answer = state.pipeline.respond(query, &state.transcript).await;
        println!("bot> {}", answer.localized_text);
        // Speech is an external capability; surface the locale tag the
        // synthesis layer would use for this turn.
        println!("     [speech: {}]", answer.speech_locale);
    }

    info!(turns = state.transcript.len().await, "session ended");
    Ok(())
}
