use crate::indicators::patterns::types::BullishPattern;
use crate::indicators::patterns::{double_candle, single_candle, triple_candle};
use crate::market::CandleSeries;
use tracing::debug;

/// Minimum candles needed before any rule is evaluated.
pub const MIN_CANDLES: usize = 2;

pub struct PatternRecognizer;

impl PatternRecognizer {
    /// Evaluate every bullish rule against the newest candles of `series`.
    ///
    /// Rules are independent, so several patterns can match at once. The
    /// result keeps the fixed evaluation order of [`BullishPattern::ALL`].
    pub fn detect(series: &CandleSeries) -> Vec<BullishPattern> {
        if series.len() < MIN_CANDLES {
            debug!("Only {} candles, skipping pattern recognition", series.len());
            return Vec::new();
        }

        let candles = series.tail(3);
        let mut patterns = Vec::new();

        double_candle::check_bullish_engulfing(candles, &mut patterns);
        single_candle::check_hammer(candles, &mut patterns);
        single_candle::check_inverted_hammer(candles, &mut patterns);
        double_candle::check_piercing_line(candles, &mut patterns);
        triple_candle::check_morning_star(candles, &mut patterns);

        patterns
    }
}
