//! Criterion Scoring — pluggable, trait-based scorer producing the five sub-scores for one resume.
//!
//! Backends:
//! - `LlmCriterionScorer`: semantic scoring via the model API (one outbound call, no retry).
//! - `KeywordCriterionScorer` (see `heuristics`): pure-Rust, deterministic, no network.
//!
//! The orchestrator holds an `Arc<dyn CriterionScorer>`, chosen at startup via `SCORER_BACKEND`.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::llm_client::{LlmClient, LlmError};
use crate::ranking::models::{CriterionScores, CriterionWeights, ErrorKind, ScoreCard};
use crate::ranking::prompts::{build_criterion_scoring_prompt, criterion_scoring_system};

// ────────────────────────────────────────────────────────────────────────────
// Errors and input
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("scoring service unavailable: {reason}")]
    Unavailable { reason: String, transient: bool },

    #[error("scoring timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("invalid scoring response: {0}")]
    InvalidResponse(String),
}

impl ScoringError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScoringError::Unavailable { .. } => ErrorKind::ScoringUnavailable,
            ScoringError::Timeout(_) => ErrorKind::ScoringTimeout,
            ScoringError::InvalidResponse(_) => ErrorKind::InvalidResponse,
        }
    }

    /// Only transient unavailability is worth another attempt. Timeouts already consumed the
    /// per-call budget and malformed replies are not retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, ScoringError::Unavailable { transient: true, .. })
    }
}

impl From<LlmError> for ScoringError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Parse(_) | LlmError::EmptyContent => {
                ScoringError::InvalidResponse(e.to_string())
            }
            LlmError::Http(_) | LlmError::Api { .. } => ScoringError::Unavailable {
                transient: e.is_transient(),
                reason: e.to_string(),
            },
        }
    }
}

/// Request-scoped inputs for scoring one resume.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    pub resume_text: &'a str,
    pub job_description: &'a str,
    pub technical_keywords: &'a [String],
    pub soft_skill_keywords: &'a [String],
    /// Only used to tell a model which sections matter; never scales the returned sub-scores.
    pub weights: &'a CriterionWeights,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The criterion scorer trait. Implement this to swap backends without touching the
/// orchestrator or combiner.
#[async_trait]
pub trait CriterionScorer: Send + Sync {
    async fn score(&self, input: &ScoringInput<'_>) -> Result<ScoreCard, ScoringError>;

    /// Backend label reported in the ranking response, e.g. "llm" or "keyword".
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// LlmCriterionScorer
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmCriterionScorer {
    llm: LlmClient,
}

impl LlmCriterionScorer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

/// Shape the model is asked to return.
#[derive(Debug, Deserialize)]
struct LlmScorePayload {
    #[serde(default)]
    candidate_name: Option<String>,
    scores: CriterionScores,
    #[serde(default)]
    tech_skills_scores: BTreeMap<String, f64>,
    #[serde(default)]
    soft_skills_scores: BTreeMap<String, f64>,
    #[serde(default)]
    analysis: Option<String>,
}

#[async_trait]
impl CriterionScorer for LlmCriterionScorer {
    async fn score(&self, input: &ScoringInput<'_>) -> Result<ScoreCard, ScoringError> {
        let prompt = build_criterion_scoring_prompt(
            input.job_description,
            input.resume_text,
            input.technical_keywords,
            input.soft_skill_keywords,
            input.weights,
        );
        let payload: LlmScorePayload = self
            .llm
            .call_json(&prompt, &criterion_scoring_system())
            .await?;

        let card = into_score_card(payload)?;
        debug!(
            "LLM scored {:?}: {:?}",
            card.candidate_name.as_deref().unwrap_or("unknown"),
            card.scores
        );
        Ok(card)
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

fn into_score_card(payload: LlmScorePayload) -> Result<ScoreCard, ScoringError> {
    if let Some((criterion, value)) = payload.scores.out_of_range() {
        return Err(ScoringError::InvalidResponse(format!(
            "{} score {value} is outside {}–{}",
            criterion.as_str(),
            CriterionScores::MIN,
            CriterionScores::MAX
        )));
    }

    let candidate_name = payload
        .candidate_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty() && !n.eq_ignore_ascii_case("unknown"));

    Ok(ScoreCard {
        scores: payload.scores,
        candidate_name,
        analysis: payload.analysis.filter(|a| !a.trim().is_empty()),
        technical_keyword_scores: clamp_unit(payload.tech_skills_scores),
        soft_skill_keyword_scores: clamp_unit(payload.soft_skills_scores),
    })
}

/// Keyword strengths are advisory; keep finite values and pin them to 0.0–1.0.
fn clamp_unit(scores: BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    scores
        .into_iter()
        .filter(|(_, v)| v.is_finite())
        .map(|(k, v)| (k.trim().to_lowercase(), v.clamp(0.0, 1.0)))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
