// src/utils/log_utils.rs
use anyhow::Result;
use chrono::Local;
use std::fs::{create_dir_all, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Append a timestamped line to `log_file`, creating parent directories as needed.
pub fn log_to_file(log_file: &Path, message: &str) -> Result<()> {
    if let Some(log_dir) = log_file.parent() {
        if !log_dir.as_os_str().is_empty() && !log_dir.exists() {
            create_dir_all(log_dir)?;
        }
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    writeln!(file, "[{}] {}", timestamp, message)?;

    Ok(())
}
