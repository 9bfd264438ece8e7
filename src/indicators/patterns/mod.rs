// Module exports
mod double_candle;
mod recognizer;
mod single_candle;
mod triple_candle;
mod types;
mod utils;

// Public exports
pub use recognizer::{PatternRecognizer, MIN_CANDLES};
pub use types::BullishPattern;
