// Module exports
pub mod bitget;
pub mod error;
pub mod models;

// Public exports
pub use bitget::BitgetClient;
pub use error::MarketDataError;
pub use models::{Candle, CandleSeries};
