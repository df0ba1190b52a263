//! hlwatch - Hyperliquid position watcher entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Hyperliquid position watcher with Telegram notifications
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via HLWATCH_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    hlwatch_telemetry::init_logging()?;

    info!("Starting hlwatch v{}", env!("CARGO_PKG_VERSION"));

    // CLI arg > HLWATCH_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("HLWATCH_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");

    let config = hlwatch_bot::AppConfig::load(&config_path)?;
    info!(
        info_url = %config.info_url,
        chat_id = config.telegram.chat_id,
        admins = config.telegram.admins.len(),
        "Configuration loaded"
    );

    let app = hlwatch_bot::Application::new(config)?;
    app.run().await?;

    Ok(())
}
