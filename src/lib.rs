// Export all necessary modules
pub mod chart;
pub mod cli;
pub mod config;
pub mod indicators;
pub mod market;
pub mod notification;
pub mod pipeline;
pub mod utils;
