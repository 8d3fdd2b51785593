//! Resume Analyzer — standalone quality review of a single resume.
//!
//! Independent of ranking: no job description, no weights, never touches the combiner.
//! Shares the extractor, the LLM client and the `ScoringError` taxonomy with the ranking path.

pub mod handlers;
pub mod prompts;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm_client::LlmClient;
use crate::ranking::scoring::ScoringError;
use prompts::{build_resume_review_prompt, resume_review_system};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionScores {
    pub content_quality: f64,
    pub resume_structure: f64,
    pub ats_essentials: f64,
    pub overall_score: f64,
}

impl SectionScores {
    fn out_of_range(&self) -> Option<(&'static str, f64)> {
        [
            ("content_quality", self.content_quality),
            ("resume_structure", self.resume_structure),
            ("ats_essentials", self.ats_essentials),
            ("overall_score", self.overall_score),
        ]
        .into_iter()
        .find(|(_, score)| !score.is_finite() || !(0.0..=100.0).contains(score))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentQualityChecks {
    #[serde(default)]
    pub impact_statements: bool,
    #[serde(default)]
    pub grammar: bool,
    #[serde(default)]
    pub ats_readability: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureChecks {
    #[serde(default)]
    pub education: bool,
    #[serde(default)]
    pub experience: bool,
    #[serde(default)]
    pub contact_info: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AtsChecks {
    #[serde(default)]
    pub format: bool,
    #[serde(default)]
    pub design: bool,
    #[serde(default)]
    pub email: bool,
    #[serde(default)]
    pub hyperlinks: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubpointChecks {
    #[serde(default)]
    pub content_quality: ContentQualityChecks,
    #[serde(default)]
    pub resume_structure: StructureChecks,
    #[serde(default)]
    pub ats_essentials: AtsChecks,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewSuggestions {
    #[serde(default)]
    pub content_quality: String,
    #[serde(default)]
    pub resume_structure: String,
    #[serde(default)]
    pub ats_essentials: String,
    #[serde(default)]
    pub overall: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    #[serde(default)]
    pub candidate_name: Option<String>,
    pub scores: SectionScores,
    #[serde(default)]
    pub subpoints: SubpointChecks,
    #[serde(default)]
    pub suggestions: ReviewSuggestions,
}

/// Response body for `POST /api/v1/resumes/analyze`.
#[derive(Debug, Clone, Serialize)]
pub struct SingleResumeAnalysis {
    pub source_filename: String,
    pub candidate_email: Option<String>,
    pub analysis: ResumeAnalysis,
}

#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    async fn analyze(&self, resume_text: &str) -> Result<ResumeAnalysis, ScoringError>;
}

pub struct LlmResumeAnalyzer {
    llm: LlmClient,
}

impl LlmResumeAnalyzer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResumeAnalyzer for LlmResumeAnalyzer {
    async fn analyze(&self, resume_text: &str) -> Result<ResumeAnalysis, ScoringError> {
        let prompt = build_resume_review_prompt(resume_text);
        let analysis: ResumeAnalysis = self
            .llm
            .call_json(&prompt, &resume_review_system())
            .await?;
        let analysis = validate_analysis(analysis)?;
        debug!(
            "Reviewed resume for {:?}: overall {}",
            analysis.candidate_name.as_deref().unwrap_or("unknown"),
            analysis.scores.overall_score
        );
        Ok(analysis)
    }
}

fn validate_analysis(mut analysis: ResumeAnalysis) -> Result<ResumeAnalysis, ScoringError> {
    if let Some((section, score)) = analysis.scores.out_of_range() {
        return Err(ScoringError::InvalidResponse(format!(
            "{section} score {score} is outside 0–100"
        )));
    }
    analysis.candidate_name = analysis
        .candidate_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty() && !n.eq_ignore_ascii_case("unknown"));
    Ok(analysis)
}
