use std::sync::Arc;

use anyhow::Result;
use sqlx::PgPool;

use crate::cache::ProfileCache;
use crate::config::Config;
use crate::errors::AppError;
use crate::github::GithubClient;
use crate::llm_client::LlmClient;
use crate::pipeline::summary::Summarizer;
use crate::talent::TalentClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Redis when `REDIS_URL` is set, process-local otherwise.
    pub cache: Arc<dyn ProfileCache>,
    /// `None` without `TALENT_API_KEY`; live recomputation is then refused.
    pub talent: Option<TalentClient>,
    pub github: GithubClient,
    pub summarizer: Summarizer,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, db: PgPool, cache: Arc<dyn ProfileCache>) -> Result<Self> {
        let talent = config
            .talent_api_key
            .clone()
            .map(TalentClient::new)
            .transpose()?;
        let github = GithubClient::new(config.github_token.clone())?;
        let llm = config
            .openai_api_key
            .clone()
            .map(LlmClient::new)
            .transpose()?;

        Ok(Self {
            db,
            cache,
            talent,
            github,
            summarizer: Summarizer::new(llm),
            config,
        })
    }

    pub fn talent(&self) -> Result<&TalentClient, AppError> {
        self.talent
            .as_ref()
            .ok_or_else(|| AppError::Config("TALENT_API_KEY is not configured".to_string()))
    }
}
