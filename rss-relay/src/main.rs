use anyhow::Context;
use clap::Parser;
use rss_relay::{Config, RssRelay};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "rss_relay.log";

/// Relays new RSS/Atom feed entries to a Telegram channel.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to the configuration file.
    #[arg(long, default_value = "configurations/config.toml")]
    config: PathBuf,

    /// Directory for the log file.
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_dir)?;

    info!("Starting RSS relay");

    let config = Config::load(&args.config).map_err(|e| {
        error!("Failed to read configuration. Exiting: {}", e);
        e
    })?;

    let relay = RssRelay::new(&config)
        .await
        .context("Failed to initialise relay")?;

    relay
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    info!("RSS relay stopped");
    Ok(())
}

fn init_tracing(log_dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let log_file = File::create(log_dir.join(LOG_FILE)).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}
