use std::fmt;

/// Bullish candlestick formations recognised by the alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BullishPattern {
    BullishEngulfing,
    Hammer,
    InvertedHammer,
    PiercingLine,
    MorningStar,
}

impl BullishPattern {
    /// All patterns, in evaluation order.
    pub const ALL: [BullishPattern; 5] = [
        BullishPattern::BullishEngulfing,
        BullishPattern::Hammer,
        BullishPattern::InvertedHammer,
        BullishPattern::PiercingLine,
        BullishPattern::MorningStar,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BullishPattern::BullishEngulfing => "Bullish Engulfing",
            BullishPattern::Hammer => "Hammer",
            BullishPattern::InvertedHammer => "Inverted Hammer",
            BullishPattern::PiercingLine => "Piercing Line",
            BullishPattern::MorningStar => "Morning Star",
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            BullishPattern::BullishEngulfing => "bullish_engulfing",
            BullishPattern::Hammer => "hammer",
            BullishPattern::InvertedHammer => "inverted_hammer",
            BullishPattern::PiercingLine => "piercing_line",
            BullishPattern::MorningStar => "morning_star",
        }
    }

    /// Built-in trading note sent along with an alert.
    pub fn default_note(&self) -> &'static str {
        match self {
            BullishPattern::BullishEngulfing => {
                "Strong reversal. Entry after close. SL below the low. TP 1.5-2x SL."
            }
            BullishPattern::Hammer => {
                "Buying pressure after a sell-off. Entry above the high. SL below the low. TP 2x SL."
            }
            BullishPattern::InvertedHammer => {
                "Potential reversal. Wait for confirmation! SL below the low. TP 1.5x SL."
            }
            BullishPattern::PiercingLine => {
                "Strong counter by buyers. Entry above the high. SL below the low. TP 2x SL."
            }
            BullishPattern::MorningStar => {
                "3-candle reversal. Entry after the 3rd candle. SL below the middle low. TP 2x SL."
            }
        }
    }

    /// Look a pattern up by display name or id, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name) || p.id().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for BullishPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
