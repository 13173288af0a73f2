// src/report.rs
//! CSV report and summary statistics for a finished run.

use crate::analysis::AnalysisResult;
use crate::utils::{round2, timestamped_path, write_file_content};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const REPORT_PREFIX: &str = "Analyzed_Jobs";
const LIST_SEPARATOR: &str = "; ";

/// One CSV row; field order is column order.
#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    s_no: usize,
    search_category: &'a str,
    title: &'a str,
    company: &'a str,
    location: &'a str,
    url: &'a str,
    match_score: f64,
    weighted_score: f64,
    skills_score: f64,
    experience_score: f64,
    role_score: f64,
    education_score: f64,
    german_required: &'static str,
    key_matches: String,
    missing_skills: String,
    recommendation: &'a str,
}

impl<'a> ReportRow<'a> {
    fn new(index: usize, result: &'a AnalysisResult) -> Self {
        Self {
            s_no: index + 1,
            search_category: &result.listing.category,
            title: &result.listing.title,
            company: &result.listing.company,
            location: &result.listing.location,
            url: &result.listing.url,
            match_score: result.overall_score,
            weighted_score: result.weighted_score(),
            skills_score: result.scores.skills,
            experience_score: result.scores.experience,
            role_score: result.scores.role,
            education_score: result.scores.education,
            german_required: yes_no(result.german_required),
            key_matches: join_skills(result.matching_skills.iter()),
            missing_skills: join_skills(result.missing_skills.iter()),
            recommendation: &result.recommendation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub category: String,
    pub jobs: usize,
    pub average_score: f64,
    pub german_required: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopMatch {
    pub category: String,
    pub title: String,
    pub company: String,
    pub url: String,
    pub match_score: f64,
    pub german_required: bool,
    pub key_matches: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_analyzed: usize,
    pub average_score: f64,
    pub german_required: usize,
    pub categories: Vec<CategoryStats>,
    pub top_matches: Vec<TopMatch>,
}

#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub csv: PathBuf,
    pub summary: PathBuf,
}

/// Write one row per result, in the given order.
pub fn write_csv<W: Write>(results: &[AnalysisResult], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for (index, result) in results.iter().enumerate() {
        csv_writer
            .serialize(ReportRow::new(index, result))
            .with_context(|| format!("Failed to write CSV row for {}", result.listing.url))?;
    }
    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Overall and per-category statistics plus the `top_n` best scores.
///
/// Ties in the top list keep their input order.
pub fn summarize(results: &[AnalysisResult], top_n: usize) -> ReportSummary {
    let german_required = results.iter().filter(|r| r.german_required).count();

    let mut by_category: BTreeMap<&str, (usize, f64, usize)> = BTreeMap::new();
    for result in results {
        let entry = by_category
            .entry(result.listing.category.as_str())
            .or_insert((0, 0.0, 0));
        entry.0 += 1;
        entry.1 += result.overall_score;
        if result.german_required {
            entry.2 += 1;
        }
    }

    let categories = by_category
        .into_iter()
        .map(|(category, (jobs, total, german))| CategoryStats {
            category: category.to_string(),
            jobs,
            average_score: round2(total / jobs as f64),
            german_required: german,
        })
        .collect();

    let mut ranked: Vec<&AnalysisResult> = results.iter().collect();
    ranked.sort_by(|a, b| b.overall_score.total_cmp(&a.overall_score));
    let top_matches = ranked
        .into_iter()
        .take(top_n)
        .map(|r| TopMatch {
            category: r.listing.category.clone(),
            title: r.listing.title.clone(),
            company: r.listing.company.clone(),
            url: r.listing.url.clone(),
            match_score: r.overall_score,
            german_required: r.german_required,
            key_matches: join_skills(r.matching_skills.iter()),
        })
        .collect();

    ReportSummary {
        total_analyzed: results.len(),
        average_score: mean(results.iter().map(|r| r.overall_score)),
        german_required,
        categories,
        top_matches,
    }
}

pub struct ReportWriter {
    output_dir: PathBuf,
    timestamp: String,
}

impl ReportWriter {
    pub fn new(output_dir: &Path, timestamp: &str) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            timestamp: timestamp.to_string(),
        }
    }

    pub fn csv_path(&self) -> PathBuf {
        timestamped_path(&self.output_dir, REPORT_PREFIX, &self.timestamp, "csv")
    }

    pub fn summary_path(&self) -> PathBuf {
        timestamped_path(
            &self.output_dir,
            REPORT_PREFIX,
            &format!("{}_summary", self.timestamp),
            "json",
        )
    }

    /// Write the CSV and the JSON summary. Nothing is written for an empty run.
    pub async fn write(
        &self,
        results: &[AnalysisResult],
        top_n: usize,
    ) -> Result<Option<(ReportPaths, ReportSummary)>> {
        if results.is_empty() {
            warn!("No jobs were analyzed successfully, no report written");
            return Ok(None);
        }

        let mut csv_bytes = Vec::new();
        write_csv(results, &mut csv_bytes)?;
        let csv_path = self.csv_path();
        write_file_content(&csv_path, &csv_bytes).await?;
        info!(path = %csv_path.display(), rows = results.len(), "Results saved");

        let summary = summarize(results, top_n);
        let summary_json =
            serde_json::to_vec_pretty(&summary).context("Failed to serialize report summary")?;
        let summary_path = self.summary_path();
        write_file_content(&summary_path, &summary_json).await?;

        log_summary(&summary);

        Ok(Some((
            ReportPaths {
                csv: csv_path,
                summary: summary_path,
            },
            summary,
        )))
    }
}

pub fn log_summary(summary: &ReportSummary) {
    info!(
        total = summary.total_analyzed,
        average_score = summary.average_score,
        german_required = summary.german_required,
        "Analysis summary"
    );
    for stats in &summary.categories {
        info!(
            category = %stats.category,
            jobs = stats.jobs,
            average_score = stats.average_score,
            german_required = stats.german_required,
            "Category summary"
        );
    }
    for (rank, top) in summary.top_matches.iter().enumerate() {
        info!(
            rank = rank + 1,
            score = top.match_score,
            category = %top.category,
            title = %top.title,
            company = %top.company,
            german_required = top.german_required,
            key_matches = %top.key_matches,
            "Top match"
        );
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (count, total) = values.fold((0usize, 0.0), |(n, sum), v| (n + 1, sum + v));
    if count == 0 {
        0.0
    } else {
        round2(total / count as f64)
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn join_skills<'a>(skills: impl Iterator<Item = &'a String>) -> String {
    skills
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}
