//! Talent Protocol client for profile search, data points and wallet lookup.
//!
//! Every call is authenticated with the `X-API-KEY` header. Search results are
//! paginated (25 per page at most) and sorted by score, then id.
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{GithubProjects, Profile};

pub mod seeds;
pub mod slugs;

pub use slugs::DataPoints;

pub const TALENT_API_BASE: &str = "https://api.talentprotocol.com";
pub const SEARCH_PAGE_SIZE: u32 = 25;
/// Upper bound on pages walked by `search_all`, in case pagination never ends.
const MAX_SEARCH_PAGES: u32 = 200;

#[derive(Debug, Error)]
pub enum TalentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The three ways the leaderboard finds profiles.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchQuery {
    Wallets(Vec<String>),
    Identity(String),
    Credential { slug: String, min: u64 },
}

impl SearchQuery {
    pub fn to_json(&self) -> Value {
        match self {
            SearchQuery::Wallets(wallets) => json!({
                "walletAddresses": wallets,
                "exactMatch": true,
            }),
            SearchQuery::Identity(identity) => json!({ "identity": identity }),
            SearchQuery::Credential { slug, min } => json!({
                "credentials": [{ "slug": slug, "valueRange": { "min": min } }],
            }),
        }
    }
}

fn sort_json() -> Value {
    json!({ "score": { "order": "desc" }, "id": { "order": "desc" } })
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub last_page: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub profiles: Vec<TalentProfile>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl SearchPage {
    pub fn has_next(&self) -> bool {
        self.pagination
            .as_ref()
            .is_some_and(|p| p.current_page < p.last_page)
    }
}

/// A profile as returned by Talent's advanced search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TalentProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub main_wallet: Option<String>,
    #[serde(default)]
    pub human_checkmark: Option<bool>,
    #[serde(default)]
    pub relative_path: Option<String>,
    #[serde(default)]
    pub score: Option<Value>,
    #[serde(default)]
    pub builder_score: Option<Value>,
}

impl TalentProfile {
    /// Builder score: `score` first (number or `{points}`), then `builder_score`, else 0.
    pub fn builder_score(&self) -> i32 {
        fn points(v: &Value) -> Option<f64> {
            match v {
                Value::Number(n) => n.as_f64(),
                Value::Object(o) => o
                    .get("points")
                    .and_then(Value::as_f64)
                    .filter(|p| *p != 0.0),
                _ => None,
            }
        }

        self.score
            .as_ref()
            .and_then(points)
            .or_else(|| self.builder_score.as_ref().and_then(points))
            .map(|p| p.round() as i32)
            .unwrap_or(0)
    }

    /// Converts to a leaderboard profile. Profiles whose id is not a UUID are dropped.
    pub fn into_profile(self) -> Option<Profile> {
        let id = match Uuid::parse_str(&self.id) {
            Ok(id) => id,
            Err(_) => {
                warn!("Skipping Talent profile with non-UUID id '{}'", self.id);
                return None;
            }
        };
        let builder_score = self.builder_score();

        Some(Profile {
            id,
            display_name: self.display_name,
            name: self.name,
            username: self.username,
            image_url: self.image_url,
            bio: self.bio,
            main_wallet: self.main_wallet,
            human_checkmark: self.human_checkmark.unwrap_or(false),
            builder_score,
            builder_earnings: None,
            github_user_id: None,
            github_username: None,
            github_stats: Default::default(),
            onchain_stats: Default::default(),
            github_projects: GithubProjects::default(),
            recent_project: None,
            searched_identity: None,
            has_mantle_credential: false,
            relative_path: self.relative_path,
        })
    }
}

#[derive(Debug, Deserialize)]
struct DataPointsResponse {
    #[serde(default)]
    data_points: Vec<RawDataPoint>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDataPoint {
    #[serde(default)]
    pub credential_slug: Option<String>,
    #[serde(default)]
    pub readable_value: Option<Value>,
    #[serde(default)]
    pub account_source: Option<String>,
    #[serde(default)]
    pub account_identifier: Option<String>,
}

/// Folds raw data points into stats. The first GitHub-sourced point names the GitHub user id.
pub fn collect_data_points(points: &[RawDataPoint]) -> DataPoints {
    let mut result = DataPoints::default();
    for dp in points {
        if let Some(slug) = dp.credential_slug.as_deref() {
            let value = dp.readable_value.as_ref().and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            });
            result.assign(slug, value);
        }
        if result.github_user_id.is_none() && dp.account_source.as_deref() == Some("github") {
            result.github_user_id = dp.account_identifier.clone().filter(|s| !s.is_empty());
        }
    }
    result
}

#[derive(Debug, Deserialize)]
struct AccountsResponse {
    #[serde(default)]
    accounts: Vec<Account>,
}

#[derive(Debug, Deserialize)]
struct Account {
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    identifier: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    profile: Option<ProfileWallet>,
}

#[derive(Debug, Deserialize)]
struct ProfileWallet {
    main_wallet: Option<String>,
}

fn wallet_from_accounts(accounts: &[Account]) -> Option<String> {
    accounts
        .iter()
        .filter(|a| matches!(a.source.as_deref(), Some("wallet" | "ethereum" | "evm")))
        .find_map(|a| {
            [a.address.as_deref(), a.identifier.as_deref()]
                .into_iter()
                .flatten()
                .find(|s| s.starts_with("0x"))
                .map(String::from)
        })
}

#[derive(Clone)]
pub struct TalentClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TalentClient {
    pub fn new(api_key: String) -> Result<Self, TalentError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(30)).build()?,
            base_url: TALENT_API_BASE.to_string(),
            api_key,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, TalentError> {
        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .header("Accept", "application/json")
            .header("X-API-KEY", &self.api_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TalentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// One page of `/search/advanced/profiles`.
    pub async fn search_profiles(
        &self,
        query: &SearchQuery,
        page: u32,
        per_page: u32,
    ) -> Result<SearchPage, TalentError> {
        self.get_json(
            "/search/advanced/profiles",
            &[
                ("query", query.to_json().to_string()),
                ("sort", sort_json().to_string()),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ],
        )
        .await
    }

    /// Walks every page of a search. A failing page ends the walk; what was
    /// collected so far is returned.
    pub async fn search_all(&self, query: &SearchQuery) -> Vec<TalentProfile> {
        let mut all = Vec::new();
        for page in 1..=MAX_SEARCH_PAGES {
            let result = match self.search_profiles(query, page, SEARCH_PAGE_SIZE).await {
                Ok(r) => r,
                Err(e) => {
                    warn!("Talent search failed on page {page}: {e}");
                    break;
                }
            };
            if result.profiles.is_empty() {
                break;
            }
            let has_next = result.has_next();
            debug!("Talent search page {page}: {} profiles", result.profiles.len());
            all.extend(result.profiles);
            if !has_next {
                break;
            }
        }
        all
    }

    /// First profile matching an identity (ENS name, username, ...).
    pub async fn search_identity(&self, identity: &str) -> Result<Option<TalentProfile>, TalentError> {
        let query = SearchQuery::Identity(identity.to_string());
        let page = self.search_profiles(&query, 1, 1).await?;
        Ok(page.profiles.into_iter().next())
    }

    pub async fn data_points(&self, profile_id: &str) -> Result<DataPoints, TalentError> {
        let response: DataPointsResponse = self
            .get_json(
                "/data_points",
                &[
                    ("id", profile_id.to_string()),
                    ("slugs", slugs::all_slugs_param()),
                ],
            )
            .await?;
        Ok(collect_data_points(&response.data_points))
    }

    /// Finds a wallet for a profile: connected EVM accounts first, then `main_wallet`.
    pub async fn wallet_for_profile(&self, profile_id: &str) -> Result<Option<String>, TalentError> {
        let accounts: AccountsResponse = self
            .get_json("/accounts", &[("id", profile_id.to_string())])
            .await?;
        if let Some(wallet) = wallet_from_accounts(&accounts.accounts) {
            return Ok(Some(wallet));
        }

        let profile: ProfileResponse = self.get_json(&format!("/profiles/{profile_id}"), &[]).await?;
        Ok(profile.profile.and_then(|p| p.main_wallet))
    }
}
