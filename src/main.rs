use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use saudi_concierge::{ConciergeConfig, VERSION, telemetry, web};

#[derive(Parser)]
#[command(name = "saudi-concierge")]
#[command(version, about = "Streams AI-generated Saudi Arabia travel itineraries")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "CONCIERGE_CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; real environment variables win
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config =
        ConciergeConfig::load_from_path(cli.config).context("Failed to load configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let _telemetry = telemetry::init(&config.logging, cli.verbose)?;
    info!(
        "Starting saudi-concierge {} (model {})",
        VERSION, config.llm.model
    );

    web::run(config).await
}
