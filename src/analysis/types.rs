// src/analysis/types.rs
use crate::error::AnalysisError;
use crate::job_board::JobListing;
use crate::utils::round2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const SKILLS_WEIGHT: f64 = 0.30;
const EXPERIENCE_WEIGHT: f64 = 0.30;
const ROLE_WEIGHT: f64 = 0.25;
const EDUCATION_WEIGHT: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub skills: f64,
    pub experience: f64,
    pub role: f64,
    pub education: f64,
}

impl ScoreBreakdown {
    /// Weighted aggregate of the sub-scores, rounded to two decimals.
    pub fn weighted(&self) -> f64 {
        round2(
            self.skills * SKILLS_WEIGHT
                + self.experience * EXPERIENCE_WEIGHT
                + self.role * ROLE_WEIGHT
                + self.education * EDUCATION_WEIGHT,
        )
    }
}

/// The model's assessment of one listing, validated.
#[derive(Debug, Clone, PartialEq)]
pub struct FitAssessment {
    pub overall_score: f64,
    pub scores: ScoreBreakdown,
    pub german_required: bool,
    pub matching_skills: BTreeSet<String>,
    pub missing_skills: BTreeSet<String>,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub listing: JobListing,
    pub overall_score: f64,
    pub scores: ScoreBreakdown,
    pub matching_skills: BTreeSet<String>,
    pub missing_skills: BTreeSet<String>,
    pub german_required: bool,
    pub recommendation: String,
}

impl AnalysisResult {
    pub fn new(listing: JobListing, assessment: FitAssessment) -> Self {
        Self {
            listing,
            overall_score: assessment.overall_score,
            scores: assessment.scores,
            matching_skills: assessment.matching_skills,
            missing_skills: assessment.missing_skills,
            german_required: assessment.german_required,
            recommendation: assessment.recommendation,
        }
    }

    pub fn weighted_score(&self) -> f64 {
        self.scores.weighted()
    }
}

/// Wire schema the model is told to answer with. Every field is required.
#[derive(Debug, Deserialize)]
pub(crate) struct RawFitResponse {
    pub match_score: f64,
    pub score_breakdown: ScoreBreakdown,
    pub german_required: GermanFlag,
    pub key_matches: Vec<String>,
    pub missing_skills: Vec<String>,
    pub recommendation: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum GermanFlag {
    Bool(bool),
    Text(String),
}

impl GermanFlag {
    fn into_bool(self) -> Result<bool, AnalysisError> {
        match self {
            GermanFlag::Bool(flag) => Ok(flag),
            GermanFlag::Text(text) => match text.trim().to_lowercase().as_str() {
                "yes" => Ok(true),
                "no" => Ok(false),
                _ => Err(AnalysisError::MalformedResponse(format!(
                    "german_required must be \"Yes\" or \"No\", got {:?}",
                    text
                ))),
            },
        }
    }
}

impl RawFitResponse {
    /// Validate ranges and flag values; the schema itself was enforced by serde.
    pub(crate) fn into_assessment(self) -> Result<FitAssessment, AnalysisError> {
        check_score("match_score", self.match_score)?;
        check_score("score_breakdown.skills", self.score_breakdown.skills)?;
        check_score("score_breakdown.experience", self.score_breakdown.experience)?;
        check_score("score_breakdown.role", self.score_breakdown.role)?;
        check_score("score_breakdown.education", self.score_breakdown.education)?;

        let recommendation = self.recommendation.trim().to_string();
        if recommendation.is_empty() {
            return Err(AnalysisError::MalformedResponse(
                "recommendation is empty".to_string(),
            ));
        }

        Ok(FitAssessment {
            overall_score: self.match_score,
            scores: self.score_breakdown,
            german_required: self.german_required.into_bool()?,
            matching_skills: skill_set(self.key_matches),
            missing_skills: skill_set(self.missing_skills),
            recommendation,
        })
    }
}

fn check_score(field: &str, value: f64) -> Result<(), AnalysisError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(AnalysisError::MalformedResponse(format!(
            "{} out of range 0-100: {}",
            field, value
        )))
    }
}

fn skill_set(skills: Vec<String>) -> BTreeSet<String> {
    skills
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
