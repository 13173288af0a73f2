// src/analysis/mod.rs
//! Resume-to-posting fit assessment through a chat-completion model.

pub mod fit_analyzer;
pub mod llm_client;
pub mod prompts;
pub mod types;

pub use fit_analyzer::{parse_fit_response, FitAnalyzer};
pub use llm_client::{CompletionProvider, OpenAiClient};
pub use types::{AnalysisResult, FitAssessment, ScoreBreakdown};
