use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{find_profile, load_profiles, sync_authorized, sync_profiles, ProfileSource};
use crate::errors::AppError;
use crate::models::Profile;
use crate::state::AppState;
use crate::store;

#[derive(Deserialize)]
pub struct ProfilesQuery {
    pub refresh: Option<String>,
}

impl ProfilesQuery {
    /// Only the literal `true` forces a live run; any other value is ignored.
    pub fn wants_refresh(&self) -> bool {
        self.refresh.as_deref() == Some("true")
    }
}

#[derive(Serialize)]
pub struct ProfilesResponse {
    pub profiles: Vec<Profile>,
    pub total: usize,
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_age: Option<i64>,
    pub source: ProfileSource,
}

#[derive(Deserialize)]
pub struct SyncQuery {
    pub secret: Option<String>,
}

#[derive(Serialize)]
pub struct SyncResponse {
    pub success: bool,
    pub synced: usize,
    pub errors: usize,
    pub total: usize,
    pub github_rate_limited: bool,
}

#[derive(Serialize)]
pub struct SyncStatusResponse {
    pub configured: bool,
    pub profile_count: i64,
    pub last_updated: Option<DateTime<Utc>>,
}

/// GET /api/profiles
pub async fn handle_list_profiles(
    State(state): State<AppState>,
    Query(params): Query<ProfilesQuery>,
) -> Result<Json<ProfilesResponse>, AppError> {
    let loaded = load_profiles(&state, params.wants_refresh()).await?;
    Ok(Json(ProfilesResponse {
        total: loaded.profiles.len(),
        profiles: loaded.profiles,
        cached: loaded.cached,
        cache_age: loaded.cache_age,
        source: loaded.source,
    }))
}

/// GET /api/profiles/:id
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Profile>, AppError> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| AppError::Validation(format!("Invalid profile id: {id}")))?;
    find_profile(&state, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Profile {id} not found")))
}

/// POST /api/sync
pub async fn handle_sync(
    State(state): State<AppState>,
    Query(params): Query<SyncQuery>,
) -> Result<Json<SyncResponse>, AppError> {
    if !sync_authorized(state.config.sync_secret.as_deref(), params.secret.as_deref()) {
        return Err(AppError::Unauthorized);
    }
    let outcome = sync_profiles(&state).await?;
    Ok(Json(SyncResponse {
        success: true,
        synced: outcome.counts.synced,
        errors: outcome.counts.errors,
        total: outcome.total,
        github_rate_limited: outcome.github_rate_limited,
    }))
}

/// GET /api/sync
pub async fn handle_sync_status(
    State(state): State<AppState>,
) -> Result<Json<SyncStatusResponse>, AppError> {
    let status = store::sync_status(&state.db).await?;
    Ok(Json(SyncStatusResponse {
        configured: true,
        profile_count: status.profile_count,
        last_updated: status.last_updated,
    }))
}
