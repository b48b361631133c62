//! Postgres persistence for synced profiles and Mantle repositories.

pub mod profiles;
pub mod repos;

pub use profiles::{
    get_profile, list_profiles, replace_profiles, sync_status, top_profiles, upsert_profiles,
    SyncCounts, SyncStatus, UPSERT_BATCH_SIZE,
};
pub use repos::{mantle_repos_with_contributors, replace_mantle_repos, ReplaceCounts};
