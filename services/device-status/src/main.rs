//! Device Status CLI
//!
//! Command-line interface for the device liveness and status monitor.

use std::path::PathBuf;

use clap::Parser;
use device_status::token::token_from_url;
use device_status::{load_config, Config};
use tracing::Level;

#[derive(Parser)]
#[command(name = "device-status")]
#[command(about = "Device liveness polling and status aggregation service")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page URL carrying the `token` query parameter
    #[arg(short, long)]
    url: Option<String>,

    /// Bearer token (overrides the token in --url)
    #[arg(short, long)]
    token: Option<String>,

    /// Device API base URL (overrides config file)
    #[arg(long)]
    api_base_url: Option<String>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, url={:?}, api_base_url={:?}, log_level={:?}",
        args.config,
        args.url,
        args.api_base_url,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    if let Some(api_base_url) = args.api_base_url {
        config.api_base_url = api_base_url;
    }

    let token = match (args.token, &args.url) {
        (Some(token), _) => Some(token),
        (None, Some(url)) => token_from_url(url)?,
        (None, None) => None,
    };

    tracing::info!("Starting device status service");
    tracing::debug!(
        "API: {}, retry delay: {}s, locale: {}",
        config.api_base_url,
        config.retry_delay_seconds,
        config.locale
    );

    device_status::run(config, token).await?;

    Ok(())
}
