//! Batch Ranking Orchestrator — drives extraction, scoring and combination across a batch.
//!
//! Flow per request: validate → spawn one task per artifact (bounded by a request-scoped
//! semaphore) → each task extracts → scores (timeout + transient retry) → combines → releases
//! its artifact → join in submission order into pre-sized slots → stable sort → top-N.
//!
//! A failure in one resume only ever produces an errored `CandidateResult` for that resume.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::extraction::{ExtractedResume, ResumeArtifact, TextExtractor};
use crate::ranking::combiner::combine;
use crate::ranking::models::{
    BatchSummary, CandidateResult, CriterionWeights, ErrorKind, RankingRequest, RankingResponse,
    ScoreCard,
};
use crate::ranking::scoring::{CriterionScorer, ScoringError, ScoringInput};

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("invalid ranking request: {0}")]
    InvalidRequest(String),
}

/// Concurrency, timeout and retry limits for outbound scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringPolicy {
    /// Max resumes in flight at once within one request.
    pub max_concurrency: usize,
    /// Budget for one scoring attempt.
    pub scoring_timeout: Duration,
    /// Extra attempts after a transient failure.
    pub scoring_retries: u32,
    /// First retry delay; doubles on each further attempt.
    pub retry_backoff: Duration,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            scoring_timeout: Duration::from_secs(60),
            scoring_retries: 1,
            retry_backoff: Duration::from_millis(1000),
        }
    }
}

/// Immutable per-request inputs shared by that request's workers.
struct RequestContext {
    job_description: String,
    technical_keywords: Vec<String>,
    soft_skill_keywords: Vec<String>,
    weights: CriterionWeights,
}

/// Stateless between requests; cheap to clone (two `Arc`s and a `Copy` policy).
#[derive(Clone)]
pub struct RankingOrchestrator {
    extractor: Arc<dyn TextExtractor>,
    scorer: Arc<dyn CriterionScorer>,
    policy: ScoringPolicy,
}

impl RankingOrchestrator {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        scorer: Arc<dyn CriterionScorer>,
        policy: ScoringPolicy,
    ) -> Self {
        Self {
            extractor,
            scorer,
            policy,
        }
    }

    /// Ranks a batch. Only request-level validation can fail; per-resume failures are
    /// reported inside the response.
    pub async fn rank(&self, request: RankingRequest) -> Result<RankingResponse, RankingError> {
        request.validate().map_err(RankingError::InvalidRequest)?;

        let ranking_id = Uuid::new_v4();
        let span = info_span!("rank", %ranking_id, resumes = request.resumes.len());
        Ok(self.run(ranking_id, request).instrument(span).await)
    }

    async fn run(&self, ranking_id: Uuid, request: RankingRequest) -> RankingResponse {
        let RankingRequest {
            job_description,
            technical_keywords,
            soft_skill_keywords,
            weights,
            top_n,
            resumes,
        } = request;

        if weights.is_all_zero() {
            warn!("All criterion weights are zero; every scored candidate will rank at 0");
        }

        let context = Arc::new(RequestContext {
            job_description,
            technical_keywords,
            soft_skill_keywords,
            weights,
        });
        let permits = Arc::new(Semaphore::new(self.policy.max_concurrency.max(1)));
        let submitted = resumes.len();
        let filenames: Vec<String> = resumes
            .iter()
            .map(|a| a.original_filename().to_string())
            .collect();

        info!(
            "Ranking {} resumes (backend={}, max_concurrency={})",
            submitted,
            self.scorer.backend(),
            self.policy.max_concurrency
        );

        let handles: Vec<JoinHandle<CandidateResult>> = resumes
            .into_iter()
            .enumerate()
            .map(|(index, artifact)| {
                let worker = self.clone();
                let context = Arc::clone(&context);
                let permits = Arc::clone(&permits);
                tokio::spawn(
                    async move {
                        // The semaphore is never closed, so acquisition cannot fail.
                        let _permit = permits.acquire_owned().await;
                        worker.process_resume(index, artifact, &context).await
                    }
                    .in_current_span(),
                )
            })
            .collect();

        // One slot per submission, each written exactly once.
        let mut slots: Vec<Option<CandidateResult>> = (0..submitted).map(|_| None).collect();
        for (index, handle) in handles.into_iter().enumerate() {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    error!("Worker for {} aborted: {e}", filenames[index]);
                    CandidateResult::failed(
                        index,
                        filenames[index].clone(),
                        ErrorKind::Internal,
                        format!("resume processing aborted: {e}"),
                    )
                }
            };
            slots[index] = Some(result);
        }
        let results: Vec<CandidateResult> = slots.into_iter().flatten().collect();

        let (ranked_results, failed_results) = order_results(results, top_n);
        let summary = BatchSummary {
            submitted,
            scored: submitted - failed_results.len(),
            failed: failed_results.len(),
            returned: ranked_results.len(),
        };

        if summary.failed > 0 {
            warn!(
                "{} of {} resumes failed to score",
                summary.failed, summary.submitted
            );
        }
        info!(
            "Ranking complete: {} scored, {} failed, {} returned",
            summary.scored, summary.failed, summary.returned
        );

        RankingResponse {
            ranking_id,
            ranked_at: Utc::now(),
            ranked_results,
            failed_results,
            summary,
            applied_technical_keywords: context.technical_keywords.clone(),
            applied_soft_skill_keywords: context.soft_skill_keywords.clone(),
            scorer_backend: self.scorer.backend().to_string(),
        }
    }

    /// Runs one resume's pipeline, then releases its artifact regardless of outcome.
    async fn process_resume(
        &self,
        index: usize,
        artifact: ResumeArtifact,
        context: &RequestContext,
    ) -> CandidateResult {
        let result = self.evaluate(index, &artifact, context).await;

        let filename = artifact.original_filename().to_string();
        match artifact.release() {
            Ok(()) => debug!("Released artifact {filename}"),
            Err(e) => warn!("Failed to release artifact {filename}: {e}"),
        }
        result
    }

    async fn evaluate(
        &self,
        index: usize,
        artifact: &ResumeArtifact,
        context: &RequestContext,
    ) -> CandidateResult {
        let filename = artifact.original_filename();

        if !artifact.is_supported() {
            warn!("Rejected {filename}: unsupported format");
            return CandidateResult::failed(
                index,
                filename,
                ErrorKind::UnsupportedFormat,
                format!("unsupported file type '{filename}' (only .pdf and .docx are accepted)"),
            );
        }

        let extracted = match self.extractor.extract(artifact).await {
            Ok(extracted) => extracted,
            Err(e) => {
                warn!("Extraction failed for {filename}: {e}");
                return CandidateResult::failed(index, filename, e.kind(), e.to_string());
            }
        };

        let card = match self.score_with_retry(&extracted, context).await {
            Ok(card) => card,
            Err(e) => {
                warn!("Scoring failed for {filename}: {e}");
                return CandidateResult::failed(index, filename, e.kind(), e.to_string())
                    .with_email(extracted.candidate_email);
            }
        };

        match combine(&card.scores, &context.weights) {
            Ok(final_score) => {
                debug!("Scored {filename}: {final_score:.2}");
                CandidateResult::scored(index, extracted, card, final_score)
            }
            Err(e) => {
                warn!("Combination failed for {filename}: {e}");
                let mut result = CandidateResult::failed(index, filename, e.kind(), e.to_string())
                    .with_email(extracted.candidate_email);
                result.candidate_name = card.candidate_name;
                result.criterion_scores = Some(card.scores);
                result
            }
        }
    }

    /// Each attempt is bounded by `scoring_timeout`; only transient failures are retried,
    /// with exponential backoff (backoff, 2×backoff, 4×backoff, ...).
    async fn score_with_retry(
        &self,
        extracted: &ExtractedResume,
        context: &RequestContext,
    ) -> Result<ScoreCard, ScoringError> {
        let input = ScoringInput {
            resume_text: &extracted.text,
            job_description: &context.job_description,
            technical_keywords: &context.technical_keywords,
            soft_skill_keywords: &context.soft_skill_keywords,
            weights: &context.weights,
        };

        let mut attempt: u32 = 0;
        loop {
            let outcome =
                match tokio::time::timeout(self.policy.scoring_timeout, self.scorer.score(&input))
                    .await
                {
                    Ok(outcome) => outcome,
                    Err(_) => Err(ScoringError::Timeout(self.policy.scoring_timeout)),
                };

            match outcome {
                Err(e) if e.is_transient() && attempt < self.policy.scoring_retries => {
                    let delay = self.policy.retry_backoff.saturating_mul(1 << attempt.min(16));
                    attempt += 1;
                    warn!(
                        "Scoring attempt {} for {} failed ({e}), retrying after {}ms",
                        attempt,
                        extracted.source_filename,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }
}

/// Splits results into (ranked, failed).
///
/// Ranked: error-free, sorted by final score descending with submission order breaking ties,
/// then truncated to `top_n`. Failed: submission order.
pub fn order_results(
    results: Vec<CandidateResult>,
    top_n: Option<usize>,
) -> (Vec<CandidateResult>, Vec<CandidateResult>) {
    let (mut ranked, mut failed): (Vec<_>, Vec<_>) =
        results.into_iter().partition(CandidateResult::is_scored);

    ranked.sort_by(|a, b| {
        let a_score = a.final_score.unwrap_or(f64::NEG_INFINITY);
        let b_score = b.final_score.unwrap_or(f64::NEG_INFINITY);
        b_score
            .total_cmp(&a_score)
            .then(a.submission_index.cmp(&b.submission_index))
    });
    failed.sort_by_key(|r| r.submission_index);

    if let Some(n) = top_n {
        ranked.truncate(n);
    }
    (ranked, failed)
}
