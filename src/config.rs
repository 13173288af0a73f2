// src/config.rs
//! Run settings, resolved once at startup from CLI flags, environment
//! variables and built-in defaults (in that order of precedence).

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::utils::ensure_directory;
use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_SEARCH_CATEGORIES: [&str; 6] = [
    "strategy",
    "project",
    "consultant",
    "business",
    "product",
    "marketing",
];

pub const DEFAULT_JOB_BOARD_URL: &str = "https://www.arbeitnow.com";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4";
const DEFAULT_RESUME_PATH: &str = "resume.txt";
const DEFAULT_MAX_PAGES: u32 = 2;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_REQUEST_DELAY_MS: u64 = 1500;
const DEFAULT_TOP_MATCHES: usize = 5;

#[derive(Debug, Clone)]
pub struct Settings {
    pub resume_path: PathBuf,
    pub categories: Vec<String>,
    pub max_pages: u32,
    pub output_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub api_key: String,
    pub job_board_url: String,
    pub openai_base_url: String,
    pub model: String,
    pub max_retries: u32,
    pub request_delay: Duration,
    pub top_matches: usize,
}

impl Settings {
    /// Resolve settings from the process environment.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        Self::resolve(cli, |key| std::env::var(key).ok())
    }

    /// Resolve settings with an explicit environment lookup.
    ///
    /// Fails with `ConfigError` when the API key is absent, the resume file
    /// does not exist, or a numeric value does not parse.
    pub fn resolve<F>(cli: &Cli, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset, same as an absent variable.
        let var = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let api_key = var("OPENAI_API_KEY").ok_or(ConfigError::MissingApiKey)?;

        let resume_path = flag_path(&cli.resume)
            .or_else(|| var("RESUME_PATH").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RESUME_PATH));
        if !resume_path.is_file() {
            return Err(ConfigError::ResumeNotFound(resume_path));
        }

        let categories = parse_categories(
            flag_text(&cli.categories)
                .or_else(|| var("SEARCH_CATEGORIES"))
                .as_deref(),
        );

        let max_pages = match cli.max_pages {
            Some(pages) => pages,
            None => parse_number("MAX_PAGES", var("MAX_PAGES"), DEFAULT_MAX_PAGES)?,
        };
        if max_pages == 0 {
            return Err(ConfigError::InvalidValue {
                key: "MAX_PAGES",
                value: max_pages.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let output_dir = flag_path(&cli.output_dir)
            .or_else(|| var("OUTPUT_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("output"));

        let logs_dir = flag_path(&cli.logs_dir)
            .or_else(|| var("LOGS_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("logs"));

        let model = flag_text(&cli.model)
            .or_else(|| var("OPENAI_MODEL"))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let top_matches = match cli.top {
            Some(top) => top,
            None => parse_number("TOP_MATCHES", var("TOP_MATCHES"), DEFAULT_TOP_MATCHES)?,
        };

        Ok(Self {
            resume_path,
            categories,
            max_pages,
            output_dir,
            logs_dir,
            api_key,
            job_board_url: trim_base_url(
                var("JOB_BOARD_URL").unwrap_or_else(|| DEFAULT_JOB_BOARD_URL.to_string()),
            ),
            openai_base_url: trim_base_url(
                var("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            ),
            model,
            max_retries: parse_number("MAX_RETRIES", var("MAX_RETRIES"), DEFAULT_MAX_RETRIES)?,
            request_delay: Duration::from_millis(parse_number(
                "REQUEST_DELAY_MS",
                var("REQUEST_DELAY_MS"),
                DEFAULT_REQUEST_DELAY_MS,
            )?),
            top_matches,
        })
    }

    /// Ensure output and log directories exist
    pub async fn ensure_directories(&self) -> Result<()> {
        ensure_directory(&self.output_dir).await?;
        ensure_directory(&self.logs_dir).await?;
        info!(
            output_dir = %self.output_dir.display(),
            logs_dir = %self.logs_dir.display(),
            "Output directories ready"
        );
        Ok(())
    }
}

/// Split a comma-separated category list, falling back to the defaults
/// when nothing usable is left.
pub fn parse_categories(raw: Option<&str>) -> Vec<String> {
    let parsed: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();

    if parsed.is_empty() {
        DEFAULT_SEARCH_CATEGORIES
            .iter()
            .map(|c| c.to_string())
            .collect()
    } else {
        parsed
    }
}

fn flag_text(flag: &Option<String>) -> Option<String> {
    flag.clone().filter(|v| !v.trim().is_empty())
}

fn flag_path(flag: &Option<PathBuf>) -> Option<PathBuf> {
    flag.clone()
        .filter(|p| !p.as_os_str().to_string_lossy().trim().is_empty())
}

fn parse_number<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue {
                key,
                value,
                reason: e.to_string(),
            }),
    }
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
