//! Talent Protocol credential slugs and how they map onto profile stats.

use crate::models::{GithubStats, OnchainStats};

pub const GITHUB_SLUGS: &[&str] = &[
    "github_crypto_repositories_commits",
    "github_crypto_repositories_contributed",
    "github_forks",
    "github_repositories",
    "github_stars",
    "github_total_contributions",
    "github_total_commits",
    "github_mantle_eco_repositories_commits",
];

pub const EXTRA_SLUGS: &[&str] = &["talent_builder_rewards_total_usd"];

pub const ONCHAIN_SLUGS: &[&str] = &[
    "onchain_weekly_active_contracts",
    "onchain_total_contract_transactions",
    "onchain_weekly_contract_transactions",
    "onchain_total_contract_fees",
    "onchain_weekly_contract_fees",
];

/// Credential used to find builders with commits to Mantle ecosystem repos.
pub const MANTLE_CREDENTIAL_SLUG: &str = "github_mantle_eco_repositories_commits";

/// Comma-separated slug list for the `data_points` endpoint.
pub fn all_slugs_param() -> String {
    GITHUB_SLUGS
        .iter()
        .chain(EXTRA_SLUGS)
        .chain(ONCHAIN_SLUGS)
        .copied()
        .collect::<Vec<_>>()
        .join(",")
}

/// Data points collected for one profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataPoints {
    pub github_stats: GithubStats,
    pub onchain_stats: OnchainStats,
    pub github_user_id: Option<String>,
    pub builder_earnings: Option<String>,
    pub mantle_eco_commits: Option<String>,
}

impl DataPoints {
    /// Stores `value` in the slot `slug` maps to. Returns false for unknown slugs.
    pub fn assign(&mut self, slug: &str, value: Option<String>) -> bool {
        let stats = &mut self.github_stats;
        let onchain = &mut self.onchain_stats;
        match slug {
            "github_crypto_repositories_commits" => stats.crypto_commits = value,
            "github_crypto_repositories_contributed" => stats.crypto_repos_contributed = value,
            "github_forks" => stats.forks = value,
            "github_repositories" => stats.repositories = value,
            "github_stars" => stats.stars = value,
            "github_total_contributions" => stats.total_contributions = value,
            "github_total_commits" => stats.total_commits = value,
            "github_mantle_eco_repositories_commits" => {
                stats.mantle_eco_commits = value.clone();
                self.mantle_eco_commits = value;
            }
            "talent_builder_rewards_total_usd" => self.builder_earnings = value,
            "onchain_weekly_active_contracts" => onchain.weekly_active_contracts = value,
            "onchain_total_contract_transactions" => onchain.total_transactions = value,
            "onchain_weekly_contract_transactions" => onchain.weekly_transactions = value,
            "onchain_total_contract_fees" => onchain.total_fees = value,
            "onchain_weekly_contract_fees" => onchain.weekly_fees = value,
            _ => return false,
        }
        true
    }
}
