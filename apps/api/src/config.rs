use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::ranking::orchestrator::ScoringPolicy;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Which `CriterionScorer` backend ranks resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorerBackend {
    Llm,
    Keyword,
}

impl FromStr for ScorerBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "llm" => Ok(ScorerBackend::Llm),
            "keyword" => Ok(ScorerBackend::Keyword),
            other => bail!("SCORER_BACKEND must be 'llm' or 'keyword', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Start-up fails if a required variable is missing or a value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub scorer_backend: ScorerBackend,
    pub scoring_max_concurrency: usize,
    pub scoring_timeout_secs: u64,
    pub scoring_retries: u32,
    pub scoring_retry_backoff_ms: u64,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config = Config {
            anthropic_api_key: lookup("ANTHROPIC_API_KEY")
                .filter(|v| !v.trim().is_empty())
                .context("Required environment variable 'ANTHROPIC_API_KEY' is not set")?,
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            scorer_backend: parse_or(&lookup, "SCORER_BACKEND", ScorerBackend::Llm)?,
            scoring_max_concurrency: parse_or(&lookup, "SCORING_MAX_CONCURRENCY", 4)?,
            scoring_timeout_secs: parse_or(&lookup, "SCORING_TIMEOUT_SECS", 60)?,
            scoring_retries: parse_or(&lookup, "SCORING_RETRIES", 1)?,
            scoring_retry_backoff_ms: parse_or(&lookup, "SCORING_RETRY_BACKOFF_MS", 1000)?,
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        };

        if config.scoring_max_concurrency == 0 {
            bail!("SCORING_MAX_CONCURRENCY must be at least 1");
        }
        if config.scoring_timeout_secs == 0 {
            bail!("SCORING_TIMEOUT_SECS must be at least 1");
        }
        Ok(config)
    }

    pub fn scoring_policy(&self) -> ScoringPolicy {
        ScoringPolicy {
            max_concurrency: self.scoring_max_concurrency,
            scoring_timeout: Duration::from_secs(self.scoring_timeout_secs),
            scoring_retries: self.scoring_retries,
            retry_backoff: Duration::from_millis(self.scoring_retry_backoff_ms),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key} has invalid value '{raw}': {e}")),
        _ => Ok(default),
    }
}
