// src/market/bitget.rs
use crate::market::error::MarketDataError;
use crate::market::models::{Candle, CandleSeries};
use crate::utils::utils::truncate_string;
use chrono_tz::Tz;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Public spot candle endpoint, relative to the API base URL.
pub const CANDLES_PATH: &str = "/api/v2/spot/market/candles";

#[derive(Debug, Deserialize)]
struct CandleResponse {
    #[serde(default)]
    data: Option<Vec<Value>>,
}

/// Client for Bitget's public market data REST API.
pub struct BitgetClient {
    client: Client,
    base_url: String,
    timezone: Tz,
}

impl BitgetClient {
    pub fn new(base_url: &str, timezone: Tz, timeout: Duration) -> Result<Self, MarketDataError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timezone,
        })
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Fetch up to `limit` recent candles.
    ///
    /// Returns `Ok(None)` when the exchange answers with a non-success status or
    /// an empty data array. Transport errors and malformed rows are errors.
    pub async fn fetch_candles(
        &self,
        symbol: &str,
        granularity: &str,
        limit: u32,
    ) -> Result<Option<CandleSeries>, MarketDataError> {
        let url = format!("{}{}", self.base_url, CANDLES_PATH);
        let limit = limit.to_string();

        debug!("GET {} symbol={} granularity={} limit={}", url, symbol, granularity, limit);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("granularity", granularity),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Failed to fetch candles: HTTP {}", status.as_u16());
            error!("Response: {}", truncate_string(&body, 500));
            return Ok(None);
        }

        let body = response.text().await?;

        let series = parse_candles(&body, self.timezone, symbol, granularity)?;
        match &series {
            Some(series) => info!("Received {} candles for {} ({})", series.len(), symbol, granularity),
            None => warn!("No candle data found for {} ({})", symbol, granularity),
        }

        Ok(series)
    }
}

/// Decode a candle response body into an ascending series.
///
/// Rows are `[openTimeMs, open, high, low, close, ...]` with every field encoded
/// as a string; plain JSON numbers are accepted too. Bitget documents the rows as
/// newest first but does not always send them that way, so they are sorted by
/// open time. Two rows with the same open time are malformed.
pub fn parse_candles(
    body: &str,
    timezone: Tz,
    symbol: &str,
    granularity: &str,
) -> Result<Option<CandleSeries>, MarketDataError> {
    let response: CandleResponse = serde_json::from_str(body)?;

    let rows = match response.data {
        Some(rows) if !rows.is_empty() => rows,
        _ => return Ok(None),
    };

    let mut candles = rows
        .iter()
        .enumerate()
        .map(|(i, row)| parse_row(i, row, timezone))
        .collect::<Result<Vec<_>, _>>()?;
    candles.sort_by(|a, b| a.open_time().cmp(b.open_time()));

    CandleSeries::new(symbol, granularity, candles).map(Some)
}

fn parse_row(index: usize, row: &Value, timezone: Tz) -> Result<Candle, MarketDataError> {
    let fields = row
        .as_array()
        .ok_or_else(|| MarketDataError::malformed(format!("row {} is not an array", index)))?;

    if fields.len() < 5 {
        return Err(MarketDataError::malformed(format!(
            "row {} has {} fields, expected at least 5",
            index,
            fields.len()
        )));
    }

    let open_time_ms = parse_timestamp(index, &fields[0])?;
    let open = parse_price(index, "open", &fields[1])?;
    let high = parse_price(index, "high", &fields[2])?;
    let low = parse_price(index, "low", &fields[3])?;
    let close = parse_price(index, "close", &fields[4])?;

    Candle::from_epoch_millis(open_time_ms, timezone, open, high, low, close).ok_or_else(|| {
        MarketDataError::malformed(format!("row {} has out-of-range timestamp {}", index, open_time_ms))
    })
}

fn parse_timestamp(index: usize, value: &Value) -> Result<i64, MarketDataError> {
    let parsed = match value {
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    };

    parsed.ok_or_else(|| {
        MarketDataError::malformed(format!("row {} has invalid open time {}", index, value))
    })
}

fn parse_price(index: usize, field: &str, value: &Value) -> Result<f64, MarketDataError> {
    let parsed = match value {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };

    match parsed {
        Some(price) if price.is_finite() && price >= 0.0 => Ok(price),
        _ => Err(MarketDataError::malformed(format!(
            "row {} has invalid {} price {}",
            index, field, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Berlin;

    #[test]
    fn reverses_newest_first_rows() {
        let body = r#"{"code":"00000","msg":"success","data":[
            ["1700028800000","103","106","102","105","1.2","125.0","125.0"],
            ["1700014400000","101","104","100","103","1.1","113.3","113.3"],
            ["1700000000000","100","102","99","101","1.0","101.0","101.0"]
        ]}"#;

        let series = parse_candles(body, Berlin, "BTCEUR", "4h").unwrap().unwrap();
        let times: Vec<i64> = series
            .candles()
            .iter()
            .map(|c| c.open_time().timestamp_millis())
            .collect();

        assert_eq!(times, vec![1_700_000_000_000, 1_700_014_400_000, 1_700_028_800_000]);
        assert_eq!(series.last().unwrap().close(), 105.0);
        assert_eq!(series.candles()[0].open(), 100.0);
    }

    #[test]
    fn keeps_oldest_first_rows_ascending() {
        let body = r#"{"data":[
            ["1700000000000","100","102","99","101"],
            ["1700014400000","101","104","100","103"],
            ["1700028800000","103","106","102","105"]
        ]}"#;

        let series = parse_candles(body, Berlin, "BTCEUR", "4h").unwrap().unwrap();
        let times: Vec<i64> = series
            .candles()
            .iter()
            .map(|c| c.open_time().timestamp_millis())
            .collect();

        assert_eq!(times, vec![1_700_000_000_000, 1_700_014_400_000, 1_700_028_800_000]);
        assert_eq!(series.last().unwrap().close(), 105.0);
    }

    #[test]
    fn duplicate_open_times_are_errors() {
        let body = r#"{"data":[
            ["1700014400000","101","104","100","103"],
            ["1700000000000","100","102","99","101"],
            ["1700014400000","101","104","100","103"]
        ]}"#;

        assert!(matches!(
            parse_candles(body, Berlin, "BTCEUR", "4h"),
            Err(MarketDataError::Malformed(_))
        ));
    }

    #[test]
    fn accepts_numeric_fields() {
        let body = r#"{"data":[[1700000000000, 100.5, 102, 99.25, 101]]}"#;
        let series = parse_candles(body, Berlin, "BTCEUR", "4h").unwrap().unwrap();
        let candle = &series.candles()[0];

        assert_eq!(candle.open(), 100.5);
        assert_eq!(candle.low(), 99.25);
    }

    #[test]
    fn missing_or_empty_data_is_no_data() {
        assert!(parse_candles(r#"{"data":[]}"#, Berlin, "BTCEUR", "4h").unwrap().is_none());
        assert!(parse_candles(r#"{"data":null}"#, Berlin, "BTCEUR", "4h").unwrap().is_none());
        assert!(parse_candles(r#"{"code":"00000"}"#, Berlin, "BTCEUR", "4h").unwrap().is_none());
    }

    #[test]
    fn malformed_rows_are_errors() {
        let short_row = r#"{"data":[["1700000000000","100","102"]]}"#;
        assert!(matches!(
            parse_candles(short_row, Berlin, "BTCEUR", "4h"),
            Err(MarketDataError::Malformed(_))
        ));

        let bad_price = r#"{"data":[["1700000000000","abc","102","99","101"]]}"#;
        assert!(matches!(
            parse_candles(bad_price, Berlin, "BTCEUR", "4h"),
            Err(MarketDataError::Malformed(_))
        ));

        let negative = r#"{"data":[["1700000000000","-1","102","99","101"]]}"#;
        assert!(parse_candles(negative, Berlin, "BTCEUR", "4h").is_err());

        let not_array = r#"{"data":[{"open":"1"}]}"#;
        assert!(parse_candles(not_array, Berlin, "BTCEUR", "4h").is_err());
    }

    #[test]
    fn invalid_json_is_decode_error() {
        assert!(matches!(
            parse_candles("<html>", Berlin, "BTCEUR", "4h"),
            Err(MarketDataError::Decode(_))
        ));
    }
}
