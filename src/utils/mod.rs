pub mod log_utils;
pub mod utils;
