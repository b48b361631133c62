use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// GitHub metrics as reported by Talent data points. Values are Talent's
/// human-readable strings ("1.2K"), kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GithubStats {
    pub crypto_commits: Option<String>,
    pub crypto_repos_contributed: Option<String>,
    pub forks: Option<String>,
    pub repositories: Option<String>,
    pub stars: Option<String>,
    pub total_contributions: Option<String>,
    pub total_commits: Option<String>,
    pub mantle_eco_commits: Option<String>,
}

impl GithubStats {
    pub fn has_any(&self) -> bool {
        [
            &self.crypto_commits,
            &self.crypto_repos_contributed,
            &self.forks,
            &self.repositories,
            &self.stars,
            &self.total_contributions,
            &self.total_commits,
            &self.mantle_eco_commits,
        ]
        .iter()
        .any(|v| v.is_some())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnchainStats {
    pub weekly_active_contracts: Option<String>,
    pub total_transactions: Option<String>,
    pub weekly_transactions: Option<String>,
    pub total_fees: Option<String>,
    pub weekly_fees: Option<String>,
}

impl OnchainStats {
    pub fn has_any(&self) -> bool {
        [
            &self.weekly_active_contracts,
            &self.total_transactions,
            &self.weekly_transactions,
            &self.total_fees,
            &self.weekly_fees,
        ]
        .iter()
        .any(|v| v.is_some())
    }
}

/// A GitHub repository as returned by the `/users/:u/repos` listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoSummary {
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: i64,
    #[serde(default)]
    pub forks_count: i64,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GithubProjects {
    pub top_by_stars: Vec<RepoSummary>,
    pub most_recent: Vec<RepoSummary>,
    pub username: Option<String>,
}

impl GithubProjects {
    pub fn is_empty(&self) -> bool {
        self.top_by_stars.is_empty() && self.most_recent.is_empty()
    }
}

/// The builder's most recently pushed repository, with its summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentProject {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub language: Option<String>,
    pub stars: i64,
    pub pushed_at: Option<DateTime<Utc>>,
    pub readme: Option<String>,
    pub ai_summary: Option<String>,
}

/// One merged leaderboard entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub display_name: Option<String>,
    pub name: Option<String>,
    pub username: Option<String>,
    pub image_url: Option<String>,
    pub bio: Option<String>,
    pub main_wallet: Option<String>,
    pub human_checkmark: bool,
    pub builder_score: i32,
    pub builder_earnings: Option<String>,
    pub github_user_id: Option<String>,
    pub github_username: Option<String>,
    pub github_stats: GithubStats,
    pub onchain_stats: OnchainStats,
    pub github_projects: GithubProjects,
    pub recent_project: Option<RecentProject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub searched_identity: Option<String>,
    #[serde(default)]
    pub has_mantle_credential: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_path: Option<String>,
}

impl Profile {
    /// Name shown on the leaderboard.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.name.as_deref())
            .or(self.username.as_deref())
            .unwrap_or("Unknown")
    }

    /// Inflates a stored row into the API shape.
    pub fn from_row(row: ProfileRow) -> Self {
        let top_by_stars = match row.top_project_name {
            Some(name) => vec![RepoSummary {
                full_name: row
                    .github_username
                    .as_deref()
                    .map(|u| format!("{u}/{name}"))
                    .unwrap_or_default(),
                name,
                description: None,
                html_url: row.top_project_url.unwrap_or_default(),
                stargazers_count: row.top_project_stars.map(i64::from).unwrap_or(0),
                forks_count: 0,
                language: row.top_project_language,
                pushed_at: None,
                updated_at: None,
                topics: Vec::new(),
            }],
            None => Vec::new(),
        };

        let recent_project = row.recent_project_name.map(|name| RecentProject {
            full_name: row
                .github_username
                .as_deref()
                .map(|u| format!("{u}/{name}"))
                .unwrap_or_default(),
            name,
            description: row.recent_project_description,
            html_url: row.recent_project_url.unwrap_or_default(),
            language: row.recent_project_language,
            stars: 0,
            pushed_at: row.recent_project_pushed_at,
            readme: None,
            ai_summary: row.recent_project_ai_summary,
        });

        Profile {
            id: row.id,
            name: row.display_name.clone(),
            display_name: row.display_name,
            username: row.username,
            image_url: row.image_url,
            bio: row.bio,
            main_wallet: row.main_wallet,
            human_checkmark: row.human_checkmark,
            builder_score: row.builder_score,
            builder_earnings: row.builder_earnings,
            github_user_id: row.github_user_id,
            github_projects: GithubProjects {
                top_by_stars,
                most_recent: Vec::new(),
                username: row.github_username.clone(),
            },
            github_username: row.github_username,
            github_stats: GithubStats {
                crypto_commits: row.crypto_commits,
                crypto_repos_contributed: None,
                forks: row.forks,
                repositories: row.repositories,
                stars: row.stars,
                total_contributions: row.total_contributions,
                total_commits: row.total_commits,
                mantle_eco_commits: row.mantle_eco_commits,
            },
            onchain_stats: OnchainStats {
                weekly_active_contracts: row.weekly_active_contracts,
                total_transactions: row.total_transactions,
                weekly_transactions: row.weekly_transactions,
                total_fees: row.total_fees,
                weekly_fees: row.weekly_fees,
            },
            recent_project,
            searched_identity: None,
            has_mantle_credential: false,
            relative_path: None,
        }
    }
}

/// Flattened `profiles` table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub display_name: Option<String>,
    pub username: Option<String>,
    pub image_url: Option<String>,
    pub bio: Option<String>,
    pub main_wallet: Option<String>,
    pub builder_score: i32,
    pub human_checkmark: bool,

    pub github_username: Option<String>,
    pub github_user_id: Option<String>,
    pub total_commits: Option<String>,
    pub total_contributions: Option<String>,
    pub crypto_commits: Option<String>,
    pub stars: Option<String>,
    pub forks: Option<String>,
    pub repositories: Option<String>,
    pub mantle_eco_commits: Option<String>,

    pub weekly_active_contracts: Option<String>,
    pub total_transactions: Option<String>,
    pub weekly_transactions: Option<String>,
    pub total_fees: Option<String>,
    pub weekly_fees: Option<String>,

    pub builder_earnings: Option<String>,

    pub top_project_name: Option<String>,
    pub top_project_url: Option<String>,
    pub top_project_stars: Option<i32>,
    pub top_project_language: Option<String>,

    pub recent_project_name: Option<String>,
    pub recent_project_url: Option<String>,
    pub recent_project_description: Option<String>,
    pub recent_project_language: Option<String>,
    pub recent_project_ai_summary: Option<String>,
    pub recent_project_pushed_at: Option<DateTime<Utc>>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProfileRow {
    /// Flattens a merged profile for storage. Timestamps are left to the database.
    pub fn from_profile(profile: &Profile) -> Self {
        let top = profile.github_projects.top_by_stars.first();
        let recent = profile.recent_project.as_ref();

        ProfileRow {
            id: profile.id,
            display_name: non_empty(
                profile
                    .display_name
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .or(profile.name.as_deref()),
            ),
            username: non_empty(profile.username.as_deref()),
            image_url: non_empty(profile.image_url.as_deref()),
            bio: non_empty(profile.bio.as_deref()),
            main_wallet: non_empty(profile.main_wallet.as_deref()),
            builder_score: profile.builder_score,
            human_checkmark: profile.human_checkmark,

            github_username: non_empty(profile.github_username.as_deref()),
            github_user_id: non_empty(profile.github_user_id.as_deref()),
            total_commits: non_empty(profile.github_stats.total_commits.as_deref()),
            total_contributions: non_empty(profile.github_stats.total_contributions.as_deref()),
            crypto_commits: non_empty(profile.github_stats.crypto_commits.as_deref()),
            stars: non_empty(profile.github_stats.stars.as_deref()),
            forks: non_empty(profile.github_stats.forks.as_deref()),
            repositories: non_empty(profile.github_stats.repositories.as_deref()),
            mantle_eco_commits: non_empty(profile.github_stats.mantle_eco_commits.as_deref()),

            weekly_active_contracts: non_empty(
                profile.onchain_stats.weekly_active_contracts.as_deref(),
            ),
            total_transactions: non_empty(profile.onchain_stats.total_transactions.as_deref()),
            weekly_transactions: non_empty(profile.onchain_stats.weekly_transactions.as_deref()),
            total_fees: non_empty(profile.onchain_stats.total_fees.as_deref()),
            weekly_fees: non_empty(profile.onchain_stats.weekly_fees.as_deref()),

            builder_earnings: non_empty(profile.builder_earnings.as_deref()),

            top_project_name: top.and_then(|r| non_empty(Some(&r.name))),
            top_project_url: top.and_then(|r| non_empty(Some(&r.html_url))),
            top_project_stars: top
                .map(|r| i32::try_from(r.stargazers_count).unwrap_or(i32::MAX)),
            top_project_language: top.and_then(|r| non_empty(r.language.as_deref())),

            recent_project_name: recent.and_then(|r| non_empty(Some(&r.name))),
            recent_project_url: recent.and_then(|r| non_empty(Some(&r.html_url))),
            recent_project_description: recent.and_then(|r| non_empty(r.description.as_deref())),
            recent_project_language: recent.and_then(|r| non_empty(r.language.as_deref())),
            recent_project_ai_summary: recent.and_then(|r| non_empty(r.ai_summary.as_deref())),
            recent_project_pushed_at: recent.and_then(|r| r.pushed_at),

            created_at: None,
            updated_at: None,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(String::from)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn profile(id: u128, score: i32) -> Profile {
        Profile {
            id: Uuid::from_u128(id),
            display_name: Some(format!("builder-{id}")),
            name: None,
            username: None,
            image_url: None,
            bio: None,
            main_wallet: None,
            human_checkmark: false,
            builder_score: score,
            builder_earnings: None,
            github_user_id: None,
            github_username: None,
            github_stats: GithubStats::default(),
            onchain_stats: OnchainStats::default(),
            github_projects: GithubProjects::default(),
            recent_project: None,
            searched_identity: None,
            has_mantle_credential: false,
            relative_path: None,
        }
    }

    pub fn repo(name: &str, stars: i64, pushed_at: &str) -> RepoSummary {
        RepoSummary {
            name: name.to_string(),
            full_name: format!("alice/{name}"),
            description: Some(format!("{name} description")),
            html_url: format!("https://github.com/alice/{name}"),
            stargazers_count: stars,
            forks_count: 0,
            language: Some("Rust".to_string()),
            pushed_at: pushed_at.parse().ok(),
            updated_at: None,
            topics: Vec::new(),
        }
    }
}
