use axum::{extract::State, Json};
use serde::Serialize;
use tracing::{info, warn};

use super::{run_discovery, LIVE_PLAN};
use crate::models::MantleRepo;
use crate::state::AppState;
use crate::store;

const STORED_REPOS: i64 = 20;
const STORED_CONTRIBUTORS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoSource {
    Store,
    Github,
}

#[derive(Serialize)]
pub struct MantleReposResponse {
    pub repos: Vec<MantleRepo>,
    pub total: usize,
    pub source: RepoSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /api/mantle-repos
///
/// Stored repos when any exist, otherwise a live GitHub search. Failures
/// come back as an empty list with `error` set.
pub async fn handle_mantle_repos(State(state): State<AppState>) -> Json<MantleReposResponse> {
    match store::mantle_repos_with_contributors(&state.db, STORED_REPOS, STORED_CONTRIBUTORS).await {
        Ok(repos) if !repos.is_empty() => {
            info!("Returning {} Mantle repos from the store", repos.len());
            return Json(MantleReposResponse {
                total: repos.len(),
                repos,
                source: RepoSource::Store,
                error: None,
            });
        }
        Ok(_) => {}
        Err(e) => warn!("Reading stored Mantle repos failed, searching GitHub: {e}"),
    }

    match run_discovery(&state.github, &LIVE_PLAN).await {
        Ok(discovery) => Json(MantleReposResponse {
            repos: discovery.repos,
            total: discovery.found,
            source: RepoSource::Github,
            error: None,
        }),
        Err(e) => {
            warn!("Mantle repo search failed: {e}");
            Json(MantleReposResponse {
                repos: Vec::new(),
                total: 0,
                source: RepoSource::Github,
                error: Some(e.to_string()),
            })
        }
    }
}
