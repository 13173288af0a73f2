use async_trait::async_trait;
use job_fit_analyzer::analysis::{CompletionProvider, FitAnalyzer};
use job_fit_analyzer::error::{AnalysisError, FetchError};
use job_fit_analyzer::job_board::{JobScraper, PageFetcher};
use job_fit_analyzer::pipeline::{Pipeline, PipelineOptions};
use job_fit_analyzer::report::ReportWriter;
use job_fit_analyzer::retry::RetryPolicy;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

const BASE: &str = "https://board.example";

const GOOD_REPLY: &str = r#"```json
{
    "match_score": 81,
    "score_breakdown": {"skills": 85, "experience": 80, "role": 78, "education": 75},
    "german_required": "Yes",
    "key_matches": ["Market analysis", "Stakeholder management"],
    "missing_skills": ["Tableau"],
    "recommendation": "Good match; brush up on German."
}
```"#;

#[derive(Default)]
struct FakeBoard {
    pages: HashMap<String, Option<String>>,
    fetched: Arc<Mutex<Vec<(String, Instant)>>>,
}

#[async_trait]
impl PageFetcher for FakeBoard {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.fetched
            .lock()
            .unwrap()
            .push((url.to_string(), Instant::now()));
        match self.pages.get(url) {
            Some(Some(body)) => Ok(body.clone()),
            Some(None) => Err(FetchError::Status {
                url: url.to_string(),
                status: StatusCode::SERVICE_UNAVAILABLE,
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: StatusCode::NOT_FOUND,
            }),
        }
    }
}

/// Answers well for every posting except the one titled "Beta Analyst".
struct FakeModel;

#[async_trait]
impl CompletionProvider for FakeModel {
    async fn complete(&self, _system: &str, user: &str) -> Result<String, AnalysisError> {
        if user.contains("JOB TITLE: Beta Analyst") {
            Ok("I think this candidate is a great fit!".to_string())
        } else {
            Ok(GOOD_REPLY.to_string())
        }
    }
}

fn card(slug: &str, title: &str) -> String {
    format!(
        r#"<li class="list-none hover:shadow-sm">
             <h2 itemprop="title"><a itemprop="url" href="/view/{slug}">{title}</a></h2>
             <a itemprop="hiringOrganization" href="/companies/acme">Acme GmbH</a>
             <span class="text-gray-600">Berlin</span>
           </li>"#
    )
}

fn page(cards: &[String]) -> Option<String> {
    Some(format!("<html><body><ul>{}</ul></body></html>", cards.concat()))
}

fn detail(text: &str) -> Option<String> {
    Some(format!(
        r#"<html><body><div itemprop="description"><p>{text}</p></div></body></html>"#
    ))
}

fn search(category: &str, page: u32) -> String {
    format!("{BASE}/?search={category}&tags=&sort_by=newest&page={page}")
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_retries: 1,
        initial_backoff: Duration::ZERO,
        max_backoff: Duration::ZERO,
    }
}

#[tokio::test]
async fn test_full_run_against_fakes() {
    let pages: HashMap<String, Option<String>> = [
        (
            search("strategy", 1),
            page(&[card("alpha", "Alpha Strategist"), card("beta", "Beta Analyst")]),
        ),
        (search("strategy", 2), page(&[])),
        (
            search("consulting", 1),
            // "beta" again under another title: deduplicated away.
            page(&[
                card("beta", "Beta Consultant"),
                card("gamma", "Gamma Consultant"),
                card("delta", "Delta Consultant"),
            ]),
        ),
        (search("consulting", 2), None),
        (format!("{BASE}/view/alpha"), detail("Shape the strategy.")),
        (format!("{BASE}/view/beta"), detail("Analyse markets.")),
        // gamma has no detail page: skipped as a fetch failure.
        (format!("{BASE}/view/delta"), detail("Advise clients.")),
    ]
    .into_iter()
    .collect();

    let output = tempfile::tempdir().expect("tempdir");
    let scraper = JobScraper::new(
        Box::new(FakeBoard {
            pages,
            ..Default::default()
        }),
        BASE,
        Duration::ZERO,
        fast_retry(),
    )
    .expect("scraper");
    let analyzer = FitAnalyzer::new(Box::new(FakeModel), fast_retry());
    let pipeline = Pipeline::new(
        scraper,
        analyzer,
        ReportWriter::new(output.path(), "20240101_120000"),
        PipelineOptions {
            categories: vec!["strategy".to_string(), "consulting".to_string()],
            max_pages: 3,
            request_delay: Duration::ZERO,
            top_matches: 5,
        },
    );

    let outcome = pipeline.run("Ten years of strategy consulting.").await.expect("run");

    assert_eq!(outcome.scraped, 5);
    assert_eq!(outcome.unique, 4);
    assert_eq!(outcome.fetch_failures, 1);
    assert_eq!(outcome.analysis_failures, 1);

    let titles: Vec<&str> = outcome
        .results
        .iter()
        .map(|r| r.listing.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Alpha Strategist", "Delta Consultant"]);
    assert!(outcome.results.iter().all(|r| r.german_required));

    let paths = outcome.report.expect("report written");
    let mut reader = csv::Reader::from_path(&paths.csv).expect("csv");
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), outcome.results.len());
    assert_eq!(&rows[0][1], "strategy");
    assert_eq!(&rows[1][1], "consulting");
    assert_eq!(&rows[0][13], "Market analysis; Stakeholder management");

    let summary = outcome.summary.expect("summary");
    assert_eq!(summary.total_analyzed, 2);
    assert_eq!(summary.german_required, 2);
    assert_eq!(summary.average_score, 81.0);
}

#[tokio::test]
async fn test_run_with_no_results_writes_nothing() {
    let output = tempfile::tempdir().expect("tempdir");
    let scraper = JobScraper::new(
        Box::new(FakeBoard::default()),
        BASE,
        Duration::ZERO,
        fast_retry(),
    )
    .expect("scraper");
    let pipeline = Pipeline::new(
        scraper,
        FitAnalyzer::new(Box::new(FakeModel), fast_retry()),
        ReportWriter::new(output.path(), "20240101_120000"),
        PipelineOptions {
            categories: vec!["product".to_string()],
            max_pages: 2,
            request_delay: Duration::ZERO,
            top_matches: 5,
        },
    );

    let outcome = pipeline.run("resume").await.expect("run");
    assert_eq!(outcome.unique, 0);
    assert!(outcome.report.is_none());
    assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_detail_fetches_are_paced() {
    let delay = Duration::from_millis(800);
    let pages: HashMap<String, Option<String>> = [
        (
            search("product", 1),
            page(&[card("one", "Product Owner"), card("two", "Product Lead")]),
        ),
        (format!("{BASE}/view/one"), detail("Own the backlog.")),
        (format!("{BASE}/view/two"), detail("Lead the team.")),
    ]
    .into_iter()
    .collect();
    let fetched = Arc::new(Mutex::new(Vec::new()));

    let output = tempfile::tempdir().expect("tempdir");
    let scraper = JobScraper::new(
        Box::new(FakeBoard {
            pages,
            fetched: Arc::clone(&fetched),
        }),
        BASE,
        delay,
        fast_retry(),
    )
    .expect("scraper");
    let pipeline = Pipeline::new(
        scraper,
        FitAnalyzer::new(Box::new(FakeModel), fast_retry()),
        ReportWriter::new(output.path(), "20240101_120000"),
        PipelineOptions {
            categories: vec!["product".to_string()],
            max_pages: 1,
            request_delay: delay,
            top_matches: 5,
        },
    );

    let outcome = pipeline.run("resume").await.expect("run");
    assert_eq!(outcome.results.len(), 2);

    let fetched = fetched.lock().unwrap().clone();
    let detail_times: Vec<Instant> = fetched
        .iter()
        .filter(|(url, _)| url.contains("/view/"))
        .map(|(_, at)| *at)
        .collect();
    assert_eq!(detail_times.len(), 2);
    assert!(detail_times[1] - detail_times[0] >= delay);
}
