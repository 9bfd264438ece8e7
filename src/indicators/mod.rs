pub mod patterns;

// Re-export the pattern recognizer
pub use self::patterns::{BullishPattern, PatternRecognizer};
