use crate::indicators::patterns::types::BullishPattern;
use crate::indicators::patterns::utils::*;
use crate::market::Candle;

// Check for Bullish Engulfing pattern
pub fn check_bullish_engulfing(candles: &[Candle], patterns: &mut Vec<BullishPattern>) {
    let Some([prev, curr]) = window(candles, 2) else {
        return;
    };

    if is_bullish(curr)
        && is_bearish(prev)
        && curr.close() > prev.open()
        && curr.open() < prev.close()
    {
        patterns.push(BullishPattern::BullishEngulfing);
    }
}

// Check for Piercing Line pattern
pub fn check_piercing_line(candles: &[Candle], patterns: &mut Vec<BullishPattern>) {
    let Some([prev, curr]) = window(candles, 2) else {
        return;
    };

    // Midpoint is taken between the previous low and close, not the body
    let midpoint = (prev.low() + prev.close()) / 2.0;

    if is_bullish(curr) && is_bearish(prev) && curr.close() > midpoint {
        patterns.push(BullishPattern::PiercingLine);
    }
}
