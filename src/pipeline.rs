// src/pipeline.rs
//! The straight-line run: scrape every category, drop duplicates, fetch
//! descriptions, score each posting, write the report.

use crate::analysis::{AnalysisResult, FitAnalyzer, OpenAiClient};
use crate::config::Settings;
use crate::dedup::dedup_by_url;
use crate::job_board::{HttpFetcher, JobScraper};
use crate::report::{ReportPaths, ReportSummary, ReportWriter};
use crate::retry::{polite_pause, RetryPolicy};
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub categories: Vec<String>,
    pub max_pages: u32,
    pub request_delay: Duration,
    pub top_matches: usize,
}

impl From<&Settings> for PipelineOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            categories: settings.categories.clone(),
            max_pages: settings.max_pages,
            request_delay: settings.request_delay,
            top_matches: settings.top_matches,
        }
    }
}

#[derive(Debug, Default)]
pub struct RunOutcome {
    pub scraped: usize,
    pub unique: usize,
    pub fetch_failures: usize,
    pub analysis_failures: usize,
    pub results: Vec<AnalysisResult>,
    pub report: Option<ReportPaths>,
    pub summary: Option<ReportSummary>,
}

pub struct Pipeline {
    scraper: JobScraper,
    analyzer: FitAnalyzer,
    report: ReportWriter,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(
        scraper: JobScraper,
        analyzer: FitAnalyzer,
        report: ReportWriter,
        options: PipelineOptions,
    ) -> Self {
        Self {
            scraper,
            analyzer,
            report,
            options,
        }
    }

    /// Wire the production HTTP fetcher and OpenAI client from settings.
    pub fn from_settings(settings: &Settings, timestamp: &str) -> Result<Self> {
        let retry = RetryPolicy::with_max_retries(settings.max_retries);

        let scraper = JobScraper::new(
            Box::new(HttpFetcher::new()?),
            &settings.job_board_url,
            settings.request_delay,
            retry,
        )
        .context("Invalid job board URL")?;

        let client = OpenAiClient::new(
            settings.api_key.clone(),
            settings.openai_base_url.clone(),
            settings.model.clone(),
        )?;
        info!(model = client.model(), "OpenAI client initialized");
        let analyzer = FitAnalyzer::new(Box::new(client), retry);

        Ok(Self::new(
            scraper,
            analyzer,
            ReportWriter::new(&settings.output_dir, timestamp),
            PipelineOptions::from(settings),
        ))
    }

    pub async fn run(&self, resume: &str) -> Result<RunOutcome> {
        let mut outcome = RunOutcome::default();

        let mut stubs = Vec::new();
        for (index, category) in self.options.categories.iter().enumerate() {
            if index > 0 {
                polite_pause(self.options.request_delay).await;
            }
            stubs.extend(
                self.scraper
                    .scrape_category(category, self.options.max_pages)
                    .await,
            );
        }
        outcome.scraped = stubs.len();

        let unique = dedup_by_url(stubs);
        outcome.unique = unique.len();
        info!(
            unique = outcome.unique,
            duplicates = outcome.scraped - outcome.unique,
            "Collected unique jobs across all categories"
        );

        let total = unique.len();
        for (index, stub) in unique.into_iter().enumerate() {
            if index > 0 {
                polite_pause(self.options.request_delay).await;
            }
            info!(job = index + 1, total, title = %stub.title, "Processing job");

            let (url, category) = (stub.url.clone(), stub.category.clone());
            let listing = match self.scraper.fetch_listing(stub).await {
                Ok(listing) => listing,
                Err(e) => {
                    error!(
                        url = %url,
                        category = %category,
                        error = %e,
                        "Skipping job, description unavailable"
                    );
                    outcome.fetch_failures += 1;
                    continue;
                }
            };

            match self.analyzer.analyze(&listing, resume).await {
                Ok(result) => outcome.results.push(result),
                Err(e) => {
                    error!(
                        url = %url,
                        category = %category,
                        error = %e,
                        "Skipping job, analysis failed"
                    );
                    outcome.analysis_failures += 1;
                }
            }
        }

        info!(
            analyzed = outcome.results.len(),
            fetch_failures = outcome.fetch_failures,
            analysis_failures = outcome.analysis_failures,
            "Processing finished"
        );

        if let Some((paths, summary)) = self
            .report
            .write(&outcome.results, self.options.top_matches)
            .await?
        {
            outcome.report = Some(paths);
            outcome.summary = Some(summary);
        }

        Ok(outcome)
    }
}
