// src/cli.rs
use crate::config::{AppConfig, DEFAULT_CONFIG_PATH};
use crate::indicators::BullishPattern;
use crate::notification::{DeliveryStatus, StrategyNotes};
use crate::pipeline::{Pipeline, RunOutcome};
use crate::utils::utils::redact;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "bullish-candle-alert")]
#[command(about = "Bullish candlestick pattern alerts via Telegram", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch candles, check for bullish patterns and notify (default)
    Run(RunArgs),

    /// List the recognised patterns with their strategy notes
    Patterns,

    /// Validate the configuration and print a summary
    CheckConfig,
}

#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Trading pair (e.g., "BTCEUR")
    #[arg(short, long)]
    pub symbol: Option<String>,

    /// Candle granularity (e.g., "1h", "4h", "1day")
    #[arg(short, long)]
    pub granularity: Option<String>,

    /// Number of candles to fetch
    #[arg(short, long)]
    pub limit: Option<u32>,

    /// Skip chart rendering
    #[arg(long)]
    pub no_chart: bool,

    /// Log the message instead of sending it
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    /// Apply command line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(symbol) = &self.symbol {
            config.market.symbol = symbol.clone();
        }
        if let Some(granularity) = &self.granularity {
            config.market.granularity = granularity.clone();
        }
        if let Some(limit) = self.limit {
            config.market.limit = limit;
        }
    }
}

/// Execute a command from the CLI
pub async fn execute_command(command: Commands, mut config: AppConfig) -> Result<()> {
    match command {
        Commands::Run(args) => {
            args.apply(&mut config);
            config.validate(!args.dry_run)?;

            let pipeline = Pipeline::from_config(&config, !args.no_chart, args.dry_run)?;
            let outcome = pipeline.run_once().await?;
            report_outcome(&outcome);

            info!(
                "Waiting for next round (scheduled every {} minutes)",
                config.schedule.interval_minutes
            );
        }

        Commands::Patterns => {
            let notes = StrategyNotes::with_overrides(&config.strategy_notes);

            println!("{:<18} | {}", "Pattern", "Strategy note");
            println!("{:-<18}-+-{:-<60}", "", "");
            for pattern in BullishPattern::ALL {
                println!("{:<18} | {}", pattern.name(), notes.get(pattern).unwrap_or("-"));
            }
        }

        Commands::CheckConfig => {
            config.validate(true)?;

            println!("Configuration OK");
            println!("Exchange:    {}", config.market.base_url);
            println!(
                "Market:      {} ({}), {} candles, {}",
                config.market.symbol,
                config.market.granularity,
                config.market.limit,
                config.market.timezone
            );
            println!("Interval:    {} minutes", config.schedule.interval_minutes);
            println!("Bot token:   {}", redact(&config.telegram.bot_token));
            println!("Recipients:  {}", config.telegram.chat_ids.join(", "));
            println!(
                "Chart:       {}",
                if config.chart.enabled {
                    config.chart.output_dir.display().to_string()
                } else {
                    "disabled".to_string()
                }
            );
        }
    }

    Ok(())
}

fn report_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::NoData => warn!("No data received, nothing to evaluate"),
        RunOutcome::NoPattern => info!("Run finished without a pattern"),
        RunOutcome::DryRun { patterns, .. } => {
            info!("Dry run finished, {} pattern(s) detected", patterns.len())
        }
        RunOutcome::Notified { report, .. } => {
            for outcome in &report.outcomes {
                match &outcome.status {
                    DeliveryStatus::Delivered => info!("Recipient {}: delivered", outcome.chat_id),
                    DeliveryStatus::Rejected { status, .. } => {
                        warn!("Recipient {}: rejected with HTTP {}", outcome.chat_id, status)
                    }
                    DeliveryStatus::Failed(reason) => {
                        warn!("Recipient {}: failed ({})", outcome.chat_id, reason)
                    }
                }
            }
        }
    }
}
