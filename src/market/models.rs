// src/market/models.rs
use crate::market::error::MarketDataError;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// One OHLC observation for a fixed time bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    open_time: DateTime<Tz>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

impl Candle {
    pub fn new(open_time: DateTime<Tz>, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
        }
    }

    /// Build a candle from an exchange open time in UTC epoch milliseconds,
    /// converted into `timezone`. Returns `None` if the timestamp is out of range.
    pub fn from_epoch_millis(
        open_time_ms: i64,
        timezone: Tz,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    ) -> Option<Self> {
        let utc = DateTime::<Utc>::from_timestamp_millis(open_time_ms)?;
        Some(Self::new(utc.with_timezone(&timezone), open, high, low, close))
    }

    pub fn open_time(&self) -> &DateTime<Tz> {
        &self.open_time
    }

    pub fn open(&self) -> f64 {
        self.open
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn close(&self) -> f64 {
        self.close
    }
}

/// Candles for one symbol and granularity, oldest first.
#[derive(Debug, Clone)]
pub struct CandleSeries {
    symbol: String,
    granularity: String,
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Create a series, rejecting candles that are not strictly increasing in time.
    pub fn new(
        symbol: impl Into<String>,
        granularity: impl Into<String>,
        candles: Vec<Candle>,
    ) -> Result<Self, MarketDataError> {
        if let Some(pos) = candles
            .windows(2)
            .position(|pair| pair[1].open_time <= pair[0].open_time)
        {
            return Err(MarketDataError::malformed(format!(
                "candle timestamps are not strictly increasing at position {} ({} -> {})",
                pos + 1,
                candles[pos].open_time,
                candles[pos + 1].open_time
            )));
        }

        Ok(Self {
            symbol: symbol.into(),
            granularity: granularity.into(),
            candles,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn granularity(&self) -> &str {
        &self.granularity
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Most recent candle.
    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// The newest `n` candles (fewer if the series is shorter).
    pub fn tail(&self, n: usize) -> &[Candle] {
        let start = self.candles.len().saturating_sub(n);
        &self.candles[start..]
    }
}
