// src/lib.rs
//! Scrape job postings from a job board, score each against a resume with a
//! chat model, and write the results as a CSV report.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod error;
pub mod job_board;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod resume;
pub mod retry;
pub mod utils;

use anyhow::Result;
use config::Settings;
use pipeline::{Pipeline, RunOutcome};
use tracing::info;

/// Run the whole analysis with production collaborators.
///
/// The resume is read before any client is built, so a bad resume fails
/// the run without touching the network.
pub async fn run(settings: &Settings, timestamp: &str) -> Result<RunOutcome> {
    let resume = resume::load_resume(&settings.resume_path).await?;

    info!(
        categories = ?settings.categories,
        max_pages = settings.max_pages,
        "Starting job analysis"
    );

    let pipeline = Pipeline::from_settings(settings, timestamp)?;
    pipeline.run(&resume).await
}
