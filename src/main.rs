mod api;
mod gateway;

use clap::{Parser, Subcommand};
use reelbot_channels::TelegramChannel;
use reelbot_core::{
    config,
    negotiation::{NegotiationTracker, SelectionLimits},
    traits::{Channel, Downloader, Extractor},
};
use reelbot_fetch::YtDlp;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "reelbot",
    version,
    about = "Reelbot — chat bot that fetches shared videos"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot.
    Start,
    /// Check configuration and extractor availability.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Start => {
            let cfg = config::load(&cli.config)?;

            // Build channels.
            let mut channels: HashMap<String, Arc<dyn Channel>> = HashMap::new();

            if let Some(ref tg) = cfg.channel.telegram {
                if tg.enabled {
                    if tg.bot_token.is_empty() {
                        anyhow::bail!(
                            "Telegram is enabled but bot_token is empty. \
                             Set it in config.toml."
                        );
                    }
                    let channel = TelegramChannel::new(tg.clone());
                    channels.insert("telegram".to_string(), Arc::new(channel));
                }
            }

            if channels.is_empty() {
                anyhow::bail!("No channels enabled. Enable at least one channel in config.toml.");
            }

            // Build the extraction and download collaborators.
            let ytdlp = Arc::new(YtDlp::new(&cfg.download));
            let tracker = NegotiationTracker::new(
                ytdlp.clone() as Arc<dyn Extractor>,
                SelectionLimits::from(&cfg.download),
            );

            println!("Reelbot — starting...");
            let gw = Arc::new(gateway::Gateway::new(
                channels,
                tracker,
                ytdlp as Arc<dyn Downloader>,
                cfg.api.clone(),
                cfg.bot.data_dir.clone(),
            ));
            gw.run().await?;
        }
        Commands::Status => {
            let cfg = config::load(&cli.config)?;
            println!("Reelbot — Status Check\n");
            println!("Config: {}", cli.config);

            let ytdlp_ok = tokio::process::Command::new(&cfg.download.ytdlp_bin)
                .arg("--version")
                .output()
                .await
                .map(|o| o.status.success())
                .unwrap_or(false);
            println!(
                "  {}: {}",
                cfg.download.ytdlp_bin,
                if ytdlp_ok { "available" } else { "not found" }
            );

            if let Some(ref tg) = cfg.channel.telegram {
                println!(
                    "  telegram: {}",
                    if tg.enabled && !tg.bot_token.is_empty() {
                        "configured"
                    } else if tg.enabled {
                        "enabled but missing bot_token"
                    } else {
                        "disabled"
                    }
                );
            } else {
                println!("  telegram: not configured");
            }
        }
    }

    Ok(())
}
