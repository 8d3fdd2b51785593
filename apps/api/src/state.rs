use std::sync::Arc;

use crate::analysis::ResumeAnalyzer;
use crate::config::Config;
use crate::extraction::TextExtractor;
use crate::ranking::orchestrator::RankingOrchestrator;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is immutable and shared by concurrent requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub extractor: Arc<dyn TextExtractor>,
    /// Holds the pluggable `CriterionScorer`, chosen via SCORER_BACKEND.
    pub orchestrator: RankingOrchestrator,
    pub analyzer: Arc<dyn ResumeAnalyzer>,
}
