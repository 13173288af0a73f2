// src/analysis/fit_analyzer.rs
use super::llm_client::CompletionProvider;
use super::prompts::{fit_prompt, SYSTEM_PROMPT};
use super::types::{AnalysisResult, FitAssessment, RawFitResponse};
use crate::error::AnalysisError;
use crate::job_board::JobListing;
use crate::retry::{retry_with_backoff, RetryPolicy};
use tracing::{info, warn};

pub struct FitAnalyzer {
    provider: Box<dyn CompletionProvider>,
    retry: RetryPolicy,
}

impl FitAnalyzer {
    pub fn new(provider: Box<dyn CompletionProvider>, retry: RetryPolicy) -> Self {
        Self { provider, retry }
    }

    /// Score one listing against the resume.
    ///
    /// Transient API failures are retried; malformed output fails at once.
    pub async fn analyze(
        &self,
        listing: &JobListing,
        resume: &str,
    ) -> Result<AnalysisResult, AnalysisError> {
        info!(url = %listing.url, title = %listing.title, "Analyzing job with LLM");

        let user_prompt = fit_prompt(listing, resume);
        let provider = self.provider.as_ref();
        let prompt = user_prompt.as_str();

        let response = retry_with_backoff(
            self.retry,
            "completion request",
            AnalysisError::is_retryable,
            || async move { provider.complete(SYSTEM_PROMPT, prompt).await },
        )
        .await
        .map_err(|gave_up| {
            if gave_up.attempts > self.retry.max_retries {
                AnalysisError::RetriesExhausted {
                    attempts: gave_up.attempts,
                    last: Box::new(gave_up.last),
                }
            } else {
                gave_up.last
            }
        })?;

        let assessment = parse_fit_response(&response).inspect_err(|e| {
            warn!(url = %listing.url, error = %e, "Unusable model response");
        })?;

        info!(
            url = %listing.url,
            score = assessment.overall_score,
            german_required = assessment.german_required,
            "Analysis complete"
        );
        Ok(AnalysisResult::new(listing.clone(), assessment))
    }
}

/// Strictly map the model's reply onto a `FitAssessment`.
///
/// A surrounding Markdown code fence is tolerated; anything else that does
/// not match the schema is rejected.
pub fn parse_fit_response(text: &str) -> Result<FitAssessment, AnalysisError> {
    let json = strip_code_fence(text);
    let raw: RawFitResponse = serde_json::from_str(json)
        .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;
    raw.into_assessment()
}

fn strip_code_fence(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```json") {
        body = rest;
    } else if let Some(rest) = body.strip_prefix("```") {
        body = rest;
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }
    body.trim()
}
