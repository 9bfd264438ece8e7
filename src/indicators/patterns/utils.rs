use crate::market::Candle;

// Helper functions for pattern recognition
pub fn is_bullish(candle: &Candle) -> bool {
    candle.close() > candle.open()
}

pub fn is_bearish(candle: &Candle) -> bool {
    candle.close() < candle.open()
}

/// Signed body length, positive for bullish candles.
pub fn body(candle: &Candle) -> f64 {
    candle.close() - candle.open()
}

pub fn range(candle: &Candle) -> f64 {
    candle.high() - candle.low()
}

/// Last `n` candles, or `None` if fewer are available.
pub fn window(candles: &[Candle], n: usize) -> Option<&[Candle]> {
    if candles.len() < n {
        return None;
    }
    Some(&candles[candles.len() - n..])
}
