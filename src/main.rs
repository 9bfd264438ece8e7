// src/main.rs
use anyhow::Result;
use bullish_candle_alert::cli::{execute_command, Cli, Commands, RunArgs};
use bullish_candle_alert::config::AppConfig;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment
    dotenv::dotenv().ok();

    // Parse command line arguments
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    // Initialize logging, RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Execute command
    let command = cli.command.unwrap_or_else(|| Commands::Run(RunArgs::default()));
    if let Err(e) = execute_command(command, config).await {
        error!("{:#}", e);
        return Err(e);
    }

    Ok(())
}
