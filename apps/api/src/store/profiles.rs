use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::ProfileRow;

pub const UPSERT_BATCH_SIZE: usize = 50;

/// Every `profiles` column written on upsert, in bind order.
const PROFILE_COLUMNS: &[&str] = &[
    "id",
    "display_name",
    "username",
    "image_url",
    "bio",
    "main_wallet",
    "builder_score",
    "human_checkmark",
    "github_username",
    "github_user_id",
    "total_commits",
    "total_contributions",
    "crypto_commits",
    "stars",
    "forks",
    "repositories",
    "mantle_eco_commits",
    "weekly_active_contracts",
    "total_transactions",
    "weekly_transactions",
    "total_fees",
    "weekly_fees",
    "builder_earnings",
    "top_project_name",
    "top_project_url",
    "top_project_stars",
    "top_project_language",
    "recent_project_name",
    "recent_project_url",
    "recent_project_description",
    "recent_project_language",
    "recent_project_ai_summary",
    "recent_project_pushed_at",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SyncCounts {
    pub synced: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncStatus {
    pub profile_count: i64,
    pub last_updated: Option<DateTime<Utc>>,
}

fn upsert_statement(batch: &[ProfileRow]) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("INSERT INTO profiles (");
    qb.push(PROFILE_COLUMNS.join(", "));
    qb.push(") ");
    qb.push_values(batch.iter().cloned(), |mut b, row| {
        b.push_bind(row.id)
            .push_bind(row.display_name)
            .push_bind(row.username)
            .push_bind(row.image_url)
            .push_bind(row.bio)
            .push_bind(row.main_wallet)
            .push_bind(row.builder_score)
            .push_bind(row.human_checkmark)
            .push_bind(row.github_username)
            .push_bind(row.github_user_id)
            .push_bind(row.total_commits)
            .push_bind(row.total_contributions)
            .push_bind(row.crypto_commits)
            .push_bind(row.stars)
            .push_bind(row.forks)
            .push_bind(row.repositories)
            .push_bind(row.mantle_eco_commits)
            .push_bind(row.weekly_active_contracts)
            .push_bind(row.total_transactions)
            .push_bind(row.weekly_transactions)
            .push_bind(row.total_fees)
            .push_bind(row.weekly_fees)
            .push_bind(row.builder_earnings)
            .push_bind(row.top_project_name)
            .push_bind(row.top_project_url)
            .push_bind(row.top_project_stars)
            .push_bind(row.top_project_language)
            .push_bind(row.recent_project_name)
            .push_bind(row.recent_project_url)
            .push_bind(row.recent_project_description)
            .push_bind(row.recent_project_language)
            .push_bind(row.recent_project_ai_summary)
            .push_bind(row.recent_project_pushed_at);
    });
    qb.push(" ON CONFLICT (id) DO UPDATE SET ");
    qb.push(update_assignments());
    qb
}

fn update_assignments() -> String {
    PROFILE_COLUMNS
        .iter()
        .filter(|c| **c != "id")
        .map(|c| format!("{c} = EXCLUDED.{c}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Upserts rows in batches. A failing batch is counted as errors and the
/// remaining batches still run.
pub async fn upsert_profiles(
    pool: &PgPool,
    rows: &[ProfileRow],
    batch_size: usize,
) -> SyncCounts {
    let mut counts = SyncCounts::default();
    for (i, batch) in rows.chunks(batch_size.max(1)).enumerate() {
        match upsert_statement(batch).build().execute(pool).await {
            Ok(_) => {
                counts.synced += batch.len();
                info!(
                    "Synced batch {} ({}/{})",
                    i + 1,
                    counts.synced,
                    rows.len()
                );
            }
            Err(e) => {
                counts.errors += batch.len();
                warn!("Batch {} failed: {e}", i + 1);
            }
        }
    }
    counts
}

/// Clears the table, then upserts every row.
pub async fn replace_profiles(pool: &PgPool, rows: &[ProfileRow]) -> Result<SyncCounts, sqlx::Error> {
    let deleted = sqlx::query("DELETE FROM profiles").execute(pool).await?;
    info!("Cleared {} stored profiles", deleted.rows_affected());
    Ok(upsert_profiles(pool, rows, UPSERT_BATCH_SIZE).await)
}

pub async fn list_profiles(pool: &PgPool) -> Result<Vec<ProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles ORDER BY builder_score DESC, id")
        .fetch_all(pool)
        .await
}

pub async fn top_profiles(pool: &PgPool, limit: i64) -> Result<Vec<ProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, ProfileRow>(
        "SELECT * FROM profiles ORDER BY builder_score DESC, id LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn get_profile(pool: &PgPool, id: Uuid) -> Result<Option<ProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn sync_status(pool: &PgPool) -> Result<SyncStatus, sqlx::Error> {
    let (profile_count, last_updated): (i64, Option<DateTime<Utc>>) =
        sqlx::query_as("SELECT COUNT(*), MAX(updated_at) FROM profiles")
            .fetch_one(pool)
            .await?;
    Ok(SyncStatus {
        profile_count,
        last_updated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::fixtures::profile;
    use sqlx::Execute;

    #[test]
    fn test_update_assignments_skip_primary_key() {
        let set = update_assignments();
        assert!(set.starts_with("display_name = EXCLUDED.display_name"));
        assert!(!set.contains("id = EXCLUDED.id,"));
        assert_eq!(set.matches("EXCLUDED.").count(), PROFILE_COLUMNS.len() - 1);
    }

    #[test]
    fn test_upsert_statement_binds_every_column() {
        let rows: Vec<ProfileRow> = (1..=3)
            .map(|i| ProfileRow::from_profile(&profile(i, 10)))
            .collect();
        let mut qb = upsert_statement(&rows);
        let sql = qb.build().sql().to_string();
        assert!(sql.starts_with("INSERT INTO profiles (id, display_name,"));
        assert!(sql.contains(&format!("${}", PROFILE_COLUMNS.len() * 3)));
        assert!(!sql.contains(&format!("${}", PROFILE_COLUMNS.len() * 3 + 1)));
        assert!(sql.contains("ON CONFLICT (id) DO UPDATE SET"));
    }
}
