// src/pipeline.rs
use crate::chart::{renderer_from_config, ChartRenderer, NoopChartRenderer};
use crate::config::AppConfig;
use crate::indicators::{BullishPattern, PatternRecognizer};
use crate::market::{BitgetClient, CandleSeries};
use crate::notification::{compose_message, DeliveryReport, Notifier, StrategyNotes, TelegramNotifier};
use crate::utils::log_utils::log_to_file;
use crate::utils::utils::format_patterns;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Number of candles echoed to the log after a fetch.
const PREVIEW_CANDLES: usize = 5;

/// What to fetch on each run.
#[derive(Debug, Clone)]
pub struct CandleRequest {
    pub symbol: String,
    pub granularity: String,
    pub limit: u32,
}

/// How a single run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// The exchange returned no usable candles
    NoData,
    /// Candles were fetched but no rule matched
    NoPattern,
    /// Patterns matched; the message was composed but not sent
    DryRun {
        patterns: Vec<BullishPattern>,
        message: String,
    },
    /// Patterns matched and the message went out to every recipient
    Notified {
        patterns: Vec<BullishPattern>,
        report: DeliveryReport,
    },
}

/// Fetch, chart, evaluate, notify. One call per scheduled invocation.
pub struct Pipeline {
    market: BitgetClient,
    renderer: Arc<dyn ChartRenderer>,
    notifier: Box<dyn Notifier>,
    notes: StrategyNotes,
    request: CandleRequest,
    dry_run: bool,
    summary_log: Option<PathBuf>,
}

impl Pipeline {
    pub fn new(
        market: BitgetClient,
        renderer: Box<dyn ChartRenderer>,
        notifier: Box<dyn Notifier>,
        notes: StrategyNotes,
        request: CandleRequest,
    ) -> Self {
        Self {
            market,
            renderer: Arc::from(renderer),
            notifier,
            notes,
            request,
            dry_run: false,
            summary_log: None,
        }
    }

    /// Wire every component from configuration.
    pub fn from_config(config: &AppConfig, render_chart: bool, dry_run: bool) -> Result<Self> {
        let market = BitgetClient::new(
            &config.market.base_url,
            config.market.timezone()?,
            Duration::from_secs(config.market.timeout_secs),
        )
        .context("Failed to create exchange client")?;

        let renderer = if render_chart {
            renderer_from_config(&config.chart)
        } else {
            Box::new(NoopChartRenderer)
        };

        let request = CandleRequest {
            symbol: config.market.symbol.clone(),
            granularity: config.market.granularity.clone(),
            limit: config.market.limit,
        };

        let pipeline = Self::new(
            market,
            renderer,
            Box::new(TelegramNotifier::from_config(&config.telegram)),
            StrategyNotes::with_overrides(&config.strategy_notes),
            request,
        )
        .dry_run(dry_run)
        .summary_log(config.logging.file.clone());

        Ok(pipeline)
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn summary_log(mut self, path: Option<PathBuf>) -> Self {
        self.summary_log = path;
        self
    }

    #[instrument(skip(self), fields(symbol = %self.request.symbol, granularity = %self.request.granularity))]
    pub async fn run_once(&self) -> Result<RunOutcome> {
        let request = &self.request;
        info!("Fetching candle data...");

        let series = self
            .market
            .fetch_candles(&request.symbol, &request.granularity, request.limit)
            .await
            .with_context(|| format!("Failed to load candles for {}", request.symbol))?;

        let Some(series) = series else {
            warn!("No data received, stopping this run");
            self.write_summary("no data");
            return Ok(RunOutcome::NoData);
        };

        for candle in series.tail(PREVIEW_CANDLES) {
            debug!(
                "{} O={} H={} L={} C={}",
                candle.open_time().format("%Y-%m-%d %H:%M"),
                candle.open(),
                candle.high(),
                candle.low(),
                candle.close()
            );
        }

        self.render_chart(&series).await;

        let patterns = PatternRecognizer::detect(&series);
        if patterns.is_empty() {
            info!("No bullish pattern detected");
            self.write_summary(&format!("{} candles, no pattern", series.len()));
            return Ok(RunOutcome::NoPattern);
        }

        info!("Bullish pattern detected: {}", format_patterns(&patterns));

        // A non-empty series always has a last candle
        let last = series.last().context("Series has no candles")?;
        let message = compose_message(&patterns, last.open_time(), &self.notes);

        if self.dry_run {
            info!("Dry run, message not sent:\n{}", message);
            self.write_summary(&format!(
                "{} candles, patterns: {} (dry run)",
                series.len(),
                format_patterns(&patterns)
            ));
            return Ok(RunOutcome::DryRun { patterns, message });
        }

        let report = self.notifier.send(&message).await;
        info!(
            "Notification sent: {} delivered, {} failed",
            report.delivered(),
            report.failed()
        );
        self.write_summary(&format!(
            "{} candles, patterns: {}, delivered {}/{}",
            series.len(),
            format_patterns(&patterns),
            report.delivered(),
            report.outcomes.len()
        ));

        Ok(RunOutcome::Notified { patterns, report })
    }

    // Rendering writes files and may wait on an external viewer, so it runs on
    // the blocking pool. Failures are logged and the run continues.
    async fn render_chart(&self, series: &CandleSeries) {
        let renderer = Arc::clone(&self.renderer);
        let series = series.clone();

        match tokio::task::spawn_blocking(move || renderer.render(&series)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Chart rendering failed, continuing: {:#}", e),
            Err(e) => warn!("Chart rendering task aborted, continuing: {}", e),
        }
    }

    fn write_summary(&self, outcome: &str) {
        let Some(path) = &self.summary_log else {
            return;
        };

        let line = format!("{} {}: {}", self.request.symbol, self.request.granularity, outcome);
        if let Err(e) = log_to_file(path, &line) {
            warn!("Failed to write run summary to {}: {:#}", path.display(), e);
        }
    }
}
