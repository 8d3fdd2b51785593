mod analysis;
mod config;
mod errors;
mod extraction;
mod llm_client;
mod ranking;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::LlmResumeAnalyzer;
use crate::config::{Config, ScorerBackend};
use crate::extraction::{DocumentExtractor, TextExtractor};
use crate::llm_client::LlmClient;
use crate::ranking::heuristics::KeywordCriterionScorer;
use crate::ranking::orchestrator::RankingOrchestrator;
use crate::ranking::scoring::{CriterionScorer, LlmCriterionScorer};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Ranker API v{}", env!("CARGO_PKG_VERSION"));

    // One pooled HTTP client, shared by the scorer and the analyzer
    let llm = LlmClient::new(config.anthropic_api_key.clone())
        .context("failed to build LLM HTTP client")?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let scorer: Arc<dyn CriterionScorer> = match config.scorer_backend {
        ScorerBackend::Llm => Arc::new(LlmCriterionScorer::new(llm.clone())),
        ScorerBackend::Keyword => Arc::new(KeywordCriterionScorer),
    };
    let policy = config.scoring_policy();
    info!(
        "Criterion scorer: {} (max_concurrency={}, timeout={}s, retries={})",
        scorer.backend(),
        policy.max_concurrency,
        policy.scoring_timeout.as_secs(),
        policy.scoring_retries
    );

    let extractor: Arc<dyn TextExtractor> = Arc::new(DocumentExtractor);

    // Build app state
    let state = AppState {
        orchestrator: RankingOrchestrator::new(extractor.clone(), scorer, policy),
        extractor,
        analyzer: Arc::new(LlmResumeAnalyzer::new(llm)),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()), // TODO: restrict origins once the frontend host is fixed
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
