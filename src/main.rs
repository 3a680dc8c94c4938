use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::{error, info};

use telerelay::config::Config;
use telerelay::notify::telegram::BotNotifier;
use telerelay::notify::Notifier;
use telerelay::relay::monitor::MonitorRunner;
use telerelay::relay::scan::ScanRunner;
use telerelay::relay::{AppContext, Mode};
use telerelay::source::telegram::UserSession;

/// Telegram keyword alert relay
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// scan: search the last 7 days, then exit | monitor: watch in real time until Ctrl+C
    #[arg(value_enum)]
    mode: Mode,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present so RUST_LOG and TELERELAY_CONFIG can come from it too.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // Load configuration
    let config_path = std::env::var("TELERELAY_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    // Initialize logging
    let _log_guard = telerelay::logging::init(&config.logging)?;

    info!("Configuration loaded from: {}", config_path.display());
    check_config(&config)?;
    info!("  Mode: {}", cli.mode);
    info!("  Source chat: {}", config.channels.source_id);
    info!("  Target chat: {}", config.channels.target_id);
    info!("  Keywords: {}", config.keyword_set());

    run(cli.mode, &config)
        .await
        .inspect_err(|e| error!("Terminated with error: {:#}", e))
}

/// Validate before any session is opened; a rejection is logged so it also
/// lands in the log file.
fn check_config(config: &Config) -> Result<()> {
    config
        .validate()
        .context("Invalid configuration")
        .inspect_err(|e| error!("{:#}", e))
}

async fn run(mode: Mode, config: &Config) -> Result<()> {
    let bot = BotNotifier::start(&config.telegram.bot_token, config.channels.target_id).await?;
    let session = UserSession::open(&config.telegram, config.channels.source_id).await?;

    // Dropping the context closes both sessions, on success and on error alike.
    let ctx = AppContext::new(
        config.keyword_set(),
        Arc::new(session),
        Notifier::new(Arc::new(bot), config.notify.link_host.clone()),
    );

    match mode {
        Mode::Scan => {
            ScanRunner::new(ctx, config.lookback(), config.pace())
                .run(Utc::now())
                .await?;
        }
        Mode::Monitor => {
            MonitorRunner::new(ctx).run(shutdown_signal()).await?;
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a signal handler the monitor can only end on disconnect.
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
