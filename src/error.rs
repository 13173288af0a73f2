// src/error.rs
//! Domain errors for the three failure classes of a run.
//!
//! `ConfigError` aborts before any network call, `FetchError` ends pagination
//! for one category (or skips one posting), `AnalysisError` skips one listing.

use reqwest::StatusCode;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY environment variable is required")]
    MissingApiKey,

    #[error("resume file not found at {0}")]
    ResumeNotFound(PathBuf),

    #[error("failed to read resume {path}: {source}")]
    ResumeUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("resume file {0} is empty")]
    ResumeEmpty(PathBuf),

    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("no {element} found on {url}")]
    MissingElement { url: String, element: &'static str },

    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl FetchError {
    /// Whether another attempt at the same URL could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Request { source, .. } => {
                source.is_timeout() || source.is_connect() || source.is_body()
            }
            FetchError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            // Pages sometimes render the description late or behind a transient error page.
            FetchError::MissingElement { .. } => true,
            FetchError::InvalidUrl { .. } => false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("completion request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("completion API returned {status}: {message}")]
    Upstream { status: StatusCode, message: String },

    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<AnalysisError>,
    },
}

impl AnalysisError {
    /// Rate limits, server errors and transport hiccups are worth retrying.
    /// Malformed output and client errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            AnalysisError::Request(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            AnalysisError::Upstream { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            AnalysisError::MalformedResponse(_) | AnalysisError::RetriesExhausted { .. } => false,
        }
    }
}
