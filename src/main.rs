//! Resonance demo driver
//!
//! Feeds stdin lines through the feedback engine so the conversation flow
//! can be exercised without a chat transport. Each input line is
//! `<session_id> <message>`; the special commands `stats` and `quit` are
//! handled directly.

use anyhow::Result;
use clap::Parser;
use resonance::{
    fallback_reply, FallbackGenerator, FeedbackEngine, ResonanceConfig, ResponseGenerator,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "resonance", about = "Cross-chat feedback interview engine")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, env = "RESONANCE_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ResonanceConfig::load(cli.config.as_deref())?;
    info!(
        max_questions = config.max_questions_per_session,
        probe_rate = config.cross_session_probe_rate,
        "engine starting"
    );

    let engine = FeedbackEngine::new(config.clone());
    let generator = FallbackGenerator::new(config.clone());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("resonance ready; lines are `<session_id> <message>`, or `stats` / `quit`");

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" {
            break;
        }
        if line == "stats" {
            let stats = engine.get_stats().await;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            continue;
        }

        let Some((session_id, message)) = line.split_once(' ') else {
            warn!("expected `<session_id> <message>`");
            continue;
        };

        let session = engine.process_inbound(session_id, message).await?;
        let Some(context) = engine.get_context(session_id).await else {
            warn!(session_id, "session missing after processing");
            continue;
        };

        // Reply priority mirrors the production flow: cross-session probe,
        // then a catalog probe, then generated (here: fallback) text.
        let reply = if let Some(probe) = context.cross_session_probe.clone() {
            probe
        } else if context.should_probe {
            match engine.next_probe(session_id).await {
                Some(probe) => probe,
                None => generator.generate(&context, message).await?,
            }
        } else {
            generator
                .generate(&context, message)
                .await
                .unwrap_or_else(|_| fallback_reply(session.state, &config))
        };

        engine.mark_outbound_sent(session_id, &reply).await;
        println!("[{}] {}", session_id, reply);

        // Re-evaluate after the send: the reply may have spent the last
        // question of the budget.
        if engine.is_session_ending(session_id).await {
            if let Some(export) = engine.begin_export(session_id).await {
                println!(
                    "[{}] session concluded, exporting {} feedback item(s)",
                    session_id,
                    export.feedback_items.len()
                );
            }
        }
    }

    Ok(())
}
