use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    pub login: String,
    pub avatar_url: Option<String>,
    pub contributions: i64,
    pub html_url: Option<String>,
}

/// A Mantle ecosystem repository as served by `/api/mantle-repos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MantleRepo {
    /// Store id when served from Postgres, GitHub id otherwise.
    pub id: i64,
    pub github_id: Option<i64>,
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stargazers_count: i64,
    pub forks_count: i64,
    pub pushed_at: Option<DateTime<Utc>>,
    pub topics: Vec<String>,
    pub owner_username: Option<String>,
    pub owner_display_name: Option<String>,
    pub owner_image_url: Option<String>,
    pub owner_profile_id: Option<Uuid>,
    pub owner_builder_score: i32,
    pub contributors: Vec<Contributor>,
}

impl MantleRepo {
    pub fn from_row(row: MantleRepoRow, contributors: Vec<Contributor>) -> Self {
        MantleRepo {
            id: i64::from(row.id),
            github_id: row.github_id,
            name: row.name,
            full_name: row.full_name,
            html_url: row.html_url,
            description: row.description,
            language: row.language,
            stargazers_count: i64::from(row.stargazers_count),
            forks_count: i64::from(row.forks_count),
            pushed_at: row.pushed_at,
            topics: row.topics,
            owner_username: row.owner_username,
            owner_display_name: row.owner_display_name,
            owner_image_url: row.owner_image_url,
            owner_profile_id: row.owner_profile_id,
            owner_builder_score: row.owner_builder_score,
            contributors,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MantleRepoRow {
    pub id: i32,
    pub github_id: Option<i64>,
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stargazers_count: i32,
    pub forks_count: i32,
    pub pushed_at: Option<DateTime<Utc>>,
    pub topics: Vec<String>,
    pub owner_username: Option<String>,
    pub owner_display_name: Option<String>,
    pub owner_image_url: Option<String>,
    pub owner_profile_id: Option<Uuid>,
    pub owner_builder_score: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContributorRow {
    pub id: i32,
    pub repo_id: i32,
    pub login: String,
    pub avatar_url: Option<String>,
    pub contributions: i32,
    pub html_url: Option<String>,
}

impl From<ContributorRow> for Contributor {
    fn from(row: ContributorRow) -> Self {
        Contributor {
            login: row.login,
            avatar_url: row.avatar_url,
            contributions: i64::from(row.contributions),
            html_url: row.html_url,
        }
    }
}
