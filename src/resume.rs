// src/resume.rs
use crate::error::ConfigError;
use std::path::Path;
use tracing::info;

/// Read the plain-text resume into memory.
///
/// An unreadable or blank resume is a configuration problem: nothing useful
/// can be scored without it.
pub async fn load_resume(path: &Path) -> Result<String, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::ResumeNotFound(path.to_path_buf()));
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::ResumeUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

    if content.trim().is_empty() {
        return Err(ConfigError::ResumeEmpty(path.to_path_buf()));
    }

    info!(path = %path.display(), chars = content.chars().count(), "Resume loaded");
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_loads_resume_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("resume.txt");
        std::fs::write(&path, "Jane Doe\nProduct strategy, 10 years").expect("write");

        let resume = load_resume(&path).await.expect("resume");
        assert!(resume.starts_with("Jane Doe"));
    }

    #[tokio::test]
    async fn test_missing_and_blank_resume() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope.txt");
        assert!(matches!(
            load_resume(&missing).await,
            Err(ConfigError::ResumeNotFound(_))
        ));

        let blank = dir.path().join("blank.txt");
        std::fs::write(&blank, "  \n\t").expect("write");
        assert!(matches!(
            load_resume(&blank).await,
            Err(ConfigError::ResumeEmpty(_))
        ));
    }
}
