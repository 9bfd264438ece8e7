// src/config.rs
use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/alert.toml";

/// Prefix for environment overrides, e.g. `ALERT__TELEGRAM__BOT_TOKEN`.
pub const ENV_PREFIX: &str = "ALERT";

/// Largest candle count the exchange accepts per request.
pub const MAX_CANDLE_LIMIT: u32 = 1000;

/// Application configuration, built once at startup and handed to each component.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub market: MarketConfig,
    pub schedule: ScheduleConfig,
    pub telegram: TelegramConfig,
    pub chart: ChartConfig,
    pub logging: LoggingConfig,
    /// Pattern name -> note overriding the built-in strategy guidance.
    /// An empty note removes the guidance line for that pattern.
    pub strategy_notes: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// REST API base URL
    pub base_url: String,
    /// Trading pair, e.g. "BTCEUR"
    pub symbol: String,
    /// Candle granularity, e.g. "4h"
    pub granularity: String,
    /// Number of candles to request
    pub limit: u32,
    /// IANA zone the candle timestamps are shown in
    pub timezone: String,
    /// HTTP timeout in seconds
    pub timeout_secs: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.bitget.com".to_string(),
            symbol: "BTCEUR".to_string(),
            granularity: "4h".to_string(),
            limit: 50,
            timezone: "Europe/Berlin".to_string(),
            timeout_secs: 10,
        }
    }
}

impl MarketConfig {
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("Invalid timezone '{}': {}", self.timezone, e))
    }
}

/// Polling interval used by the external scheduler. Only reported, never slept on.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub interval_minutes: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { interval_minutes: 10 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub api_base: String,
    pub bot_token: String,
    #[serde(deserialize_with = "deserialize_chat_ids")]
    pub chat_ids: Vec<String>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.telegram.org".to_string(),
            bot_token: String::new(),
            chat_ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub enabled: bool,
    pub output_dir: PathBuf,
    /// Open the rendered chart and wait for the viewer to exit
    pub open_viewer: bool,
    pub viewer_command: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: PathBuf::from("charts"),
            open_viewer: false,
            viewer_command: "xdg-open".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when RUST_LOG is not set
    pub level: String,
    /// Append run summaries to this file
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl AppConfig {
    /// Load defaults, then the TOML file at `path` if it exists, then
    /// `ALERT__*` environment variables.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let builder = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"));

        let config = builder
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        config
            .try_deserialize()
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Check the values every run depends on. Telegram settings are only
    /// required when messages are actually sent.
    pub fn validate(&self, require_telegram: bool) -> Result<()> {
        if self.market.symbol.trim().is_empty() {
            return Err(anyhow!("market.symbol must not be empty"));
        }

        if self.market.granularity.trim().is_empty() {
            return Err(anyhow!("market.granularity must not be empty"));
        }

        if self.market.limit == 0 || self.market.limit > MAX_CANDLE_LIMIT {
            return Err(anyhow!(
                "market.limit must be between 1 and {}, got {}",
                MAX_CANDLE_LIMIT,
                self.market.limit
            ));
        }

        self.market.timezone()?;

        if require_telegram {
            if self.telegram.bot_token.trim().is_empty() {
                return Err(anyhow!("telegram.bot_token is required to send notifications"));
            }

            if self.telegram.chat_ids.is_empty() {
                return Err(anyhow!("telegram.chat_ids must contain at least one recipient"));
            }

            if self.telegram.chat_ids.iter().any(|id| id.trim().is_empty()) {
                return Err(anyhow!("telegram.chat_ids contains an empty recipient id"));
            }
        }

        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ChatId {
    Text(String),
    Number(i64),
}

impl ChatId {
    fn into_string(self) -> String {
        match self {
            ChatId::Text(s) => s.trim().to_string(),
            ChatId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ChatIds {
    List(Vec<ChatId>),
    One(ChatId),
}

// Accepts a list, a single id, or a comma-separated string (handy for env vars).
fn deserialize_chat_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let ids = match ChatIds::deserialize(deserializer)? {
        ChatIds::List(ids) => ids.into_iter().map(ChatId::into_string).collect(),
        ChatIds::One(ChatId::Text(s)) => s
            .split(',')
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect(),
        ChatIds::One(id) => vec![id.into_string()],
    };

    Ok(ids)
}
