use crate::indicators::patterns::types::BullishPattern;
use crate::indicators::patterns::utils::*;
use crate::market::Candle;

// Check for Morning Star pattern
pub fn check_morning_star(candles: &[Candle], patterns: &mut Vec<BullishPattern>) {
    let Some([first, second, third]) = window(candles, 3) else {
        return;
    };

    // Morning Star criteria:
    // 1. First candle is bearish
    // 2. Second and third candles are bullish
    // 3. Second candle closes above the first candle's close
    if is_bearish(first)
        && is_bullish(second)
        && is_bullish(third)
        && second.close() > first.close()
    {
        patterns.push(BullishPattern::MorningStar);
    }
}
