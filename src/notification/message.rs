// src/notification/message.rs
use crate::indicators::BullishPattern;
use chrono::DateTime;
use chrono_tz::Tz;
use std::collections::HashMap;
use tracing::warn;

/// Timestamp format used in alert messages.
pub const MESSAGE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Strategy guidance attached to each pattern in an alert.
#[derive(Debug, Clone)]
pub struct StrategyNotes {
    notes: HashMap<BullishPattern, String>,
}

impl Default for StrategyNotes {
    fn default() -> Self {
        let notes = BullishPattern::ALL
            .into_iter()
            .map(|p| (p, p.default_note().to_string()))
            .collect();
        Self { notes }
    }
}

impl StrategyNotes {
    /// Built-in notes with configured overrides applied. Keys are pattern
    /// names or ids; unknown keys are logged and ignored.
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        let mut notes = Self::default();

        for (name, note) in overrides {
            match BullishPattern::from_name(name) {
                Some(pattern) => {
                    notes.notes.insert(pattern, note.trim().to_string());
                }
                None => warn!("Ignoring strategy note for unknown pattern '{}'", name),
            }
        }

        notes
    }

    /// Note for `pattern`, or `None` if it has been blanked out.
    pub fn get(&self, pattern: BullishPattern) -> Option<&str> {
        self.notes
            .get(&pattern)
            .map(String::as_str)
            .filter(|note| !note.is_empty())
    }
}

/// Build the alert text for `patterns` detected on the candle opened at `time`.
pub fn compose_message(patterns: &[BullishPattern], time: &DateTime<Tz>, notes: &StrategyNotes) -> String {
    let names: Vec<&str> = patterns.iter().map(|p| p.name()).collect();

    let mut message = format!(
        "📈 Bullish pattern detected: {}\n📅 Time: {}",
        names.join(", "),
        time.format(MESSAGE_TIME_FORMAT)
    );

    let guidance: Vec<String> = patterns
        .iter()
        .filter_map(|p| notes.get(*p).map(|note| format!("• {}: {}", p.name(), note)))
        .collect();

    if !guidance.is_empty() {
        message.push_str("\n\n📌 Strategy guidance:\n");
        message.push_str(&guidance.join("\n"));
    }

    message
}
