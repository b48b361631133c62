//! Profile serving: cache, then store, then a live pipeline run.

pub mod handlers;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Profile, ProfileRow};
use crate::pipeline::{build_leaderboard, PipelineOutput};
use crate::state::AppState;
use crate::store::{self, SyncCounts, UPSERT_BATCH_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileSource {
    Cache,
    Store,
    Live,
}

#[derive(Debug)]
pub struct LoadedProfiles {
    pub profiles: Vec<Profile>,
    pub cached: bool,
    pub cache_age: Option<i64>,
    pub source: ProfileSource,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub counts: SyncCounts,
    pub total: usize,
    pub github_rate_limited: bool,
}

/// Serves the leaderboard. Without `refresh` the first non-empty source wins;
/// cache and store failures are logged and skipped.
pub async fn load_profiles(state: &AppState, refresh: bool) -> Result<LoadedProfiles, AppError> {
    if !refresh {
        match state.cache.get().await {
            Ok(Some(entry)) => {
                let age = entry.age_secs(chrono::Utc::now());
                info!("Returning {} cached profiles (age {age}s)", entry.profiles.len());
                return Ok(LoadedProfiles {
                    profiles: entry.profiles,
                    cached: true,
                    cache_age: Some(age),
                    source: ProfileSource::Cache,
                });
            }
            Ok(None) => {}
            Err(e) => warn!("Profiles cache read failed: {e}"),
        }

        match store::list_profiles(&state.db).await {
            Ok(rows) if !rows.is_empty() => {
                let profiles: Vec<Profile> = rows.into_iter().map(Profile::from_row).collect();
                info!("Returning {} stored profiles", profiles.len());
                write_cache(state, &profiles).await;
                return Ok(LoadedProfiles {
                    profiles,
                    cached: false,
                    cache_age: None,
                    source: ProfileSource::Store,
                });
            }
            Ok(_) => {}
            Err(e) => warn!("Reading stored profiles failed: {e}"),
        }
    }

    let output = recompute(state).await?;
    Ok(LoadedProfiles {
        profiles: output.profiles,
        cached: false,
        cache_age: None,
        source: ProfileSource::Live,
    })
}

/// Runs the aggregation pipeline and refreshes the cache with its result.
pub async fn recompute(state: &AppState) -> Result<PipelineOutput, AppError> {
    let talent = state.talent()?;
    info!("Recomputing leaderboard (AI summaries: {})", state.summarizer.uses_ai());
    let output = build_leaderboard(talent, &state.github, &state.summarizer).await;
    write_cache(state, &output.profiles).await;
    Ok(output)
}

async fn write_cache(state: &AppState, profiles: &[Profile]) {
    if let Err(e) = state.cache.put(profiles.to_vec()).await {
        warn!("Profiles cache write failed: {e}");
    }
}

/// One profile from the cache if present, otherwise from the store.
pub async fn find_profile(state: &AppState, id: Uuid) -> Result<Option<Profile>, AppError> {
    match state.cache.get().await {
        Ok(Some(entry)) => {
            if let Some(profile) = entry.profiles.into_iter().find(|p| p.id == id) {
                return Ok(Some(profile));
            }
        }
        Ok(None) => {}
        Err(e) => warn!("Profiles cache read failed: {e}"),
    }
    Ok(store::get_profile(&state.db, id).await?.map(Profile::from_row))
}

/// `true` only when a secret is configured and the caller presented it.
pub fn sync_authorized(configured: Option<&str>, presented: Option<&str>) -> bool {
    matches!((configured, presented), (Some(expected), Some(given)) if expected == given)
}

/// Recomputes the leaderboard and upserts every profile.
pub async fn sync_profiles(state: &AppState) -> Result<SyncOutcome, AppError> {
    let output = recompute(state).await?;
    let rows: Vec<ProfileRow> = output.profiles.iter().map(ProfileRow::from_profile).collect();
    info!("Syncing {} profiles to the store...", rows.len());
    let counts = store::upsert_profiles(&state.db, &rows, UPSERT_BATCH_SIZE).await;
    info!("Sync complete: {} synced, {} errors", counts.synced, counts.errors);
    Ok(SyncOutcome {
        counts,
        total: rows.len(),
        github_rate_limited: output.github_rate_limited,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_requires_configured_secret() {
        assert!(!sync_authorized(None, None));
        assert!(!sync_authorized(None, Some("anything")));
        assert!(!sync_authorized(Some("s3cret"), None));
        assert!(!sync_authorized(Some("s3cret"), Some("wrong")));
        assert!(sync_authorized(Some("s3cret"), Some("s3cret")));
    }

    #[test]
    fn test_source_serializes_lowercase() {
        assert_eq!(serde_json::to_value(ProfileSource::Store).unwrap(), "store");
        assert_eq!(serde_json::to_value(ProfileSource::Live).unwrap(), "live");
    }
}
