// src/utils.rs
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Ensure directory exists
pub async fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        tokio::fs::create_dir_all(path)
            .await
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Write file content, creating the parent directory if needed
pub async fn write_file_content(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_directory(parent).await?;
    }

    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write file: {}", path.display()))
}

/// Timestamp used in report and log file names, e.g. `20240131_174502`.
pub fn run_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// `{dir}/{prefix}_{timestamp}.{ext}`
pub fn timestamped_path(dir: &Path, prefix: &str, timestamp: &str, ext: &str) -> PathBuf {
    dir.join(format!("{}_{}.{}", prefix, timestamp, ext))
}

/// Collapse runs of whitespace on a single line of text.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Round to two decimals for report output.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
