// src/cli.rs
use clap::Parser;
use std::path::PathBuf;

/// Scrape job postings and score each one against a resume.
///
/// Every flag overrides the matching environment variable.
#[derive(Parser, Debug, Default, Clone)]
#[command(name = "job-fit-analyzer")]
#[command(about = "Scrape job postings and rate how well they fit a resume")]
pub struct Cli {
    /// Path to the plain-text resume (RESUME_PATH)
    #[arg(long)]
    pub resume: Option<PathBuf>,

    /// Comma-separated search categories (SEARCH_CATEGORIES)
    #[arg(long)]
    pub categories: Option<String>,

    /// Maximum result pages to scrape per category (MAX_PAGES)
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Directory for the CSV report and summary (OUTPUT_DIR)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Directory for log files (LOGS_DIR)
    #[arg(long)]
    pub logs_dir: Option<PathBuf>,

    /// Chat model used for the fit analysis (OPENAI_MODEL)
    #[arg(long)]
    pub model: Option<String>,

    /// Number of best matches listed in the summary (TOP_MATCHES)
    #[arg(long)]
    pub top: Option<usize>,
}
