use thiserror::Error;

/// Errors raised while fetching or decoding exchange candle data.
///
/// A non-success HTTP status or an empty `data` array is not an error; the
/// fetcher reports those as "no data" instead.
#[derive(Debug, Error)]
pub enum MarketDataError {
    /// Transport failure (connection refused, timeout, TLS, ...)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body is not valid JSON
    #[error("Failed to decode candle response: {0}")]
    Decode(#[from] serde_json::Error),

    /// JSON was valid but a candle row did not have the expected shape
    #[error("Malformed candle data: {0}")]
    Malformed(String),
}

impl MarketDataError {
    pub fn malformed(message: impl Into<String>) -> Self {
        MarketDataError::Malformed(message.into())
    }
}
