//! Ranking — scores a batch of resumes against one job description and orders them.
//!
//! Pipeline per resume: extraction → `CriterionScorer` (five 0–100 sub-scores) →
//! `combiner::combine` (weighted sum) → ordering in `orchestrator`.

pub mod combiner;
pub mod handlers;
pub mod heuristics;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod scoring;
