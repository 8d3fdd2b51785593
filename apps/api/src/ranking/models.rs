//! Ranking data model: request, weights, criterion scores, per-candidate results, response.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::extraction::{ExtractedResume, ResumeArtifact};

// ────────────────────────────────────────────────────────────────────────────
// Criteria, weights, scores
// ────────────────────────────────────────────────────────────────────────────

/// One of the five independent scoring dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Criterion {
    Skills,
    Experience,
    Education,
    Projects,
    Achievements,
}

impl Criterion {
    /// Canonical order. The combiner always sums in this order.
    pub const ALL: [Criterion; 5] = [
        Criterion::Skills,
        Criterion::Experience,
        Criterion::Education,
        Criterion::Projects,
        Criterion::Achievements,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Criterion::Skills => "skills",
            Criterion::Experience => "experience",
            Criterion::Education => "education",
            Criterion::Projects => "projects",
            Criterion::Achievements => "achievements",
        }
    }
}

/// Caller-supplied weights. Not renormalised: a vector summing above or below 1 scales the
/// final score. A weight of 0 removes the criterion entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CriterionWeights {
    #[serde(default)]
    pub skills: f64,
    #[serde(default)]
    pub experience: f64,
    #[serde(default)]
    pub education: f64,
    #[serde(default)]
    pub projects: f64,
    #[serde(default)]
    pub achievements: f64,
}

impl CriterionWeights {
    pub fn get(&self, criterion: Criterion) -> f64 {
        match criterion {
            Criterion::Skills => self.skills,
            Criterion::Experience => self.experience,
            Criterion::Education => self.education,
            Criterion::Projects => self.projects,
            Criterion::Achievements => self.achievements,
        }
    }

    /// Every weight must be finite and non-negative, and a full-marks candidate must still
    /// combine to a finite score.
    pub fn validate(&self) -> Result<(), String> {
        for criterion in Criterion::ALL {
            let weight = self.get(criterion);
            if !weight.is_finite() || weight < 0.0 {
                return Err(format!(
                    "weight_{} must be a non-negative number, got {weight}",
                    criterion.as_str()
                ));
            }
        }
        let ceiling: f64 = Criterion::ALL
            .iter()
            .map(|&c| self.get(c) * CriterionScores::MAX)
            .sum();
        if !ceiling.is_finite() {
            return Err("weights are too large to combine into a finite score".to_string());
        }
        Ok(())
    }

    pub fn is_all_zero(&self) -> bool {
        Criterion::ALL.iter().all(|&c| self.get(c) == 0.0)
    }

    /// Criteria with a non-zero weight, in canonical order.
    pub fn active(&self) -> impl Iterator<Item = (Criterion, f64)> + '_ {
        Criterion::ALL
            .into_iter()
            .map(|c| (c, self.get(c)))
            .filter(|&(_, w)| w != 0.0)
    }
}

/// Per-criterion sub-scores on the 0–100 scale. `None` means the scorer did not produce one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriterionScores {
    #[serde(default)]
    pub skills: Option<f64>,
    #[serde(default)]
    pub experience: Option<f64>,
    #[serde(default)]
    pub education: Option<f64>,
    #[serde(default)]
    pub projects: Option<f64>,
    #[serde(default)]
    pub achievements: Option<f64>,
}

impl CriterionScores {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 100.0;

    pub fn complete(
        skills: f64,
        experience: f64,
        education: f64,
        projects: f64,
        achievements: f64,
    ) -> Self {
        Self {
            skills: Some(skills),
            experience: Some(experience),
            education: Some(education),
            projects: Some(projects),
            achievements: Some(achievements),
        }
    }

    pub fn get(&self, criterion: Criterion) -> Option<f64> {
        match criterion {
            Criterion::Skills => self.skills,
            Criterion::Experience => self.experience,
            Criterion::Education => self.education,
            Criterion::Projects => self.projects,
            Criterion::Achievements => self.achievements,
        }
    }

    /// First present, finite score outside 0–100, if any.
    pub fn out_of_range(&self) -> Option<(Criterion, f64)> {
        Criterion::ALL.into_iter().find_map(|c| {
            self.get(c)
                .filter(|s| s.is_finite() && !(Self::MIN..=Self::MAX).contains(s))
                .map(|s| (c, s))
        })
    }
}

/// Everything a scorer returns for one candidate. Only `scores` feeds the final score; the rest
/// is carried through to the result for explainability.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreCard {
    pub scores: CriterionScores,
    pub candidate_name: Option<String>,
    pub analysis: Option<String>,
    pub technical_keyword_scores: BTreeMap<String, f64>,
    pub soft_skill_keyword_scores: BTreeMap<String, f64>,
}

// ────────────────────────────────────────────────────────────────────────────
// Errors attached to candidates
// ────────────────────────────────────────────────────────────────────────────

/// Error classification surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidRequest,
    UnsupportedFormat,
    CorruptDocument,
    EmptyContent,
    ScoringUnavailable,
    ScoringTimeout,
    InvalidResponse,
    IncompleteScoring,
    /// The per-resume worker panicked.
    Internal,
}

impl ErrorKind {
    /// Wire code, identical to the serialised form.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "INVALID_REQUEST",
            ErrorKind::UnsupportedFormat => "UNSUPPORTED_FORMAT",
            ErrorKind::CorruptDocument => "CORRUPT_DOCUMENT",
            ErrorKind::EmptyContent => "EMPTY_CONTENT",
            ErrorKind::ScoringUnavailable => "SCORING_UNAVAILABLE",
            ErrorKind::ScoringTimeout => "SCORING_TIMEOUT",
            ErrorKind::InvalidResponse => "INVALID_RESPONSE",
            ErrorKind::IncompleteScoring => "INCOMPLETE_SCORING",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateFailure {
    pub kind: ErrorKind,
    pub message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Request / result / response
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct RankingRequest {
    pub job_description: String,
    pub technical_keywords: Vec<String>,
    pub soft_skill_keywords: Vec<String>,
    pub weights: CriterionWeights,
    pub top_n: Option<usize>,
    pub resumes: Vec<ResumeArtifact>,
}

impl RankingRequest {
    /// Request-level validation. Any failure here is fatal to the whole request.
    pub fn validate(&self) -> Result<(), String> {
        if self.resumes.is_empty() {
            return Err("at least one resume file is required".to_string());
        }
        if self.job_description.trim().is_empty() {
            return Err("job description cannot be empty".to_string());
        }
        if self.top_n == Some(0) {
            return Err("top_n must be a positive integer".to_string());
        }
        self.weights.validate()
    }
}

/// Exactly one per submitted artifact.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateResult {
    pub source_filename: String,
    pub submission_index: usize,
    pub candidate_email: Option<String>,
    pub candidate_name: Option<String>,
    pub criterion_scores: Option<CriterionScores>,
    pub final_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub technical_keyword_scores: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub soft_skill_keyword_scores: BTreeMap<String, f64>,
    pub error: Option<CandidateFailure>,
}

impl CandidateResult {
    pub fn scored(
        submission_index: usize,
        extracted: ExtractedResume,
        card: ScoreCard,
        final_score: f64,
    ) -> Self {
        Self {
            source_filename: extracted.source_filename,
            submission_index,
            candidate_email: extracted.candidate_email,
            candidate_name: card.candidate_name,
            criterion_scores: Some(card.scores),
            final_score: Some(final_score),
            analysis: card.analysis,
            technical_keyword_scores: card.technical_keyword_scores,
            soft_skill_keyword_scores: card.soft_skill_keyword_scores,
            error: None,
        }
    }

    pub fn failed(
        submission_index: usize,
        source_filename: impl Into<String>,
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source_filename: source_filename.into(),
            submission_index,
            candidate_email: None,
            candidate_name: None,
            criterion_scores: None,
            final_score: None,
            analysis: None,
            technical_keyword_scores: BTreeMap::new(),
            soft_skill_keyword_scores: BTreeMap::new(),
            error: Some(CandidateFailure {
                kind,
                message: message.into(),
            }),
        }
    }

    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.candidate_email = email;
        self
    }

    pub fn is_scored(&self) -> bool {
        self.error.is_none() && self.final_score.is_some()
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

/// Lets callers tell "N of M failed to score" apart from "scored but ranked low".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub submitted: usize,
    pub scored: usize,
    pub failed: usize,
    pub returned: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingResponse {
    pub ranking_id: Uuid,
    pub ranked_at: DateTime<Utc>,
    /// Best first, error-free, truncated to top_n.
    pub ranked_results: Vec<CandidateResult>,
    /// Candidates that could not be scored, in submission order.
    pub failed_results: Vec<CandidateResult>,
    pub summary: BatchSummary,
    pub applied_technical_keywords: Vec<String>,
    pub applied_soft_skill_keywords: Vec<String>,
    pub scorer_backend: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn request(job_description: &str, resumes: usize, top_n: Option<usize>) -> RankingRequest {
        RankingRequest {
            job_description: job_description.to_string(),
            technical_keywords: vec![],
            soft_skill_keywords: vec![],
            weights: CriterionWeights::default(),
            top_n,
            resumes: (0..resumes)
                .map(|i| ResumeArtifact::in_memory(format!("r{i}.pdf"), Bytes::new()))
                .collect(),
        }
    }

    #[test]
    fn test_validate_accepts_minimal_request() {
        assert!(request("Rust engineer", 1, None).validate().is_ok());
        assert!(request("Rust engineer", 2, Some(5)).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_resumes() {
        let err = request("Rust engineer", 0, None).validate().unwrap_err();
        assert!(err.contains("resume"));
    }

    #[test]
    fn test_validate_rejects_blank_job_description() {
        assert!(request("  \n\t ", 1, None).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_top_n() {
        let err = request("JD", 1, Some(0)).validate().unwrap_err();
        assert!(err.contains("top_n"));
    }

    #[test]
    fn test_weights_validate_rejects_negative_and_nan() {
        let negative = CriterionWeights {
            projects: -0.1,
            ..Default::default()
        };
        assert!(negative.validate().unwrap_err().contains("weight_projects"));

        let nan = CriterionWeights {
            skills: f64::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_weights_validate_rejects_overflowing_weights() {
        let huge = CriterionWeights {
            skills: 1e308,
            ..Default::default()
        };
        assert!(huge.validate().unwrap_err().contains("too large"));

        // Each product is finite, but the sum is not.
        let spread = CriterionWeights {
            skills: 1e306,
            experience: 1e306,
            education: 1e306,
            projects: 1e306,
            achievements: 1e306,
        };
        assert!(spread.validate().is_err());

        let large_but_fine = CriterionWeights {
            skills: 1e300,
            ..Default::default()
        };
        assert!(large_but_fine.validate().is_ok());
    }

    #[test]
    fn test_weights_active_skips_zero() {
        let weights = CriterionWeights {
            skills: 0.5,
            education: 0.2,
            ..Default::default()
        };
        let active: Vec<_> = weights.active().map(|(c, _)| c).collect();
        assert_eq!(active, vec![Criterion::Skills, Criterion::Education]);
        assert!(!weights.is_all_zero());
        assert!(CriterionWeights::default().is_all_zero());
    }

    #[test]
    fn test_scores_out_of_range() {
        let scores = CriterionScores::complete(80.0, 101.0, 50.0, 0.0, 100.0);
        assert_eq!(scores.out_of_range(), Some((Criterion::Experience, 101.0)));
        assert_eq!(
            CriterionScores::complete(0.0, 100.0, 50.0, 1.0, 99.9).out_of_range(),
            None
        );
    }

    #[test]
    fn test_scores_deserialize_with_missing_fields() {
        let scores: CriterionScores =
            serde_json::from_str(r#"{"skills": 70, "education": null}"#).unwrap();
        assert_eq!(scores.skills, Some(70.0));
        assert_eq!(scores.education, None);
        assert_eq!(scores.projects, None);
    }

    #[test]
    fn test_error_kind_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorKind::ScoringTimeout).unwrap();
        assert_eq!(json, r#""SCORING_TIMEOUT""#);
        for kind in [ErrorKind::IncompleteScoring, ErrorKind::Internal, ErrorKind::EmptyContent] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.code()));
        }
    }

    #[test]
    fn test_failed_result_is_not_scored() {
        let result = CandidateResult::failed(3, "bad.pdf", ErrorKind::CorruptDocument, "boom");
        assert!(!result.is_scored());
        assert_eq!(result.error_kind(), Some(ErrorKind::CorruptDocument));
        assert_eq!(result.submission_index, 3);
    }
}
