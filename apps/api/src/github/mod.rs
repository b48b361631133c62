//! GitHub REST client used for usernames, repositories, READMEs and the
//! Mantle repository search.
//!
//! A 429, or a 403 that reports an exhausted quota or a retry delay, flips the
//! session's rate-limit flag; from then on every call through that session
//! fails fast without a request. Other 403s are plain status errors.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{Contributor, GithubProjects, RepoSummary};

pub const GITHUB_API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = "Mantle-Leaderboard";
const README_MAX_CHARS: usize = 2000;
const PROJECTS_PER_LIST: usize = 5;

#[derive(Debug, Error)]
pub enum GithubError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub returned status {0}")]
    Status(u16),

    #[error("GitHub rate limit reached")]
    RateLimited,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    login: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchRepo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepoOwner {
    pub login: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A repository from `/search/repositories`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRepo {
    pub id: i64,
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: i64,
    #[serde(default)]
    pub forks_count: i64,
    #[serde(default)]
    pub pushed_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub owner: Option<RepoOwner>,
}

#[derive(Debug, Deserialize)]
struct RawContributor {
    login: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
    #[serde(default)]
    contributions: i64,
    #[serde(default)]
    html_url: Option<String>,
}

#[derive(Clone)]
pub struct GithubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    rate_limited: Arc<AtomicBool>,
}

impl GithubClient {
    pub fn new(token: Option<String>) -> Result<Self, GithubError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .user_agent(USER_AGENT)
                .build()?,
            base_url: GITHUB_API_BASE.to_string(),
            token,
            rate_limited: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Points the client at another API root (GitHub Enterprise, a local stub).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// A client sharing this connection pool with its own rate-limit flag.
    /// Each pipeline run or discovery pass starts from a fresh session.
    pub fn session(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: self.token.clone(),
            rate_limited: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.rate_limited.load(Ordering::Relaxed)
    }

    fn request(&self, url: &str, accept: &str) -> RequestBuilder {
        let builder = self.client.get(url).header("Accept", accept);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, GithubError> {
        if self.is_rate_limited() {
            return Err(GithubError::RateLimited);
        }

        let response = builder.send().await?;

        if let Some(remaining) = rate_limit_remaining(response.headers()) {
            if remaining < 10 {
                warn!("GitHub rate limit low: {remaining} remaining");
            }
        }

        let status = response.status();
        if is_rate_limit_response(status, response.headers()) {
            if !self.rate_limited.swap(true, Ordering::Relaxed) {
                warn!("GitHub rate limited (status {status}); skipping further GitHub calls");
            }
            return Err(GithubError::RateLimited);
        }
        if !status.is_success() {
            return Err(GithubError::Status(status.as_u16()));
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, GithubError> {
        let response = self
            .send(self.request(url, "application/vnd.github.v3+json"))
            .await?;
        Ok(response.json().await?)
    }

    /// Resolves a numeric GitHub user id to a login.
    pub async fn username_for_id(&self, github_id: &str) -> Result<Option<String>, GithubError> {
        let base = &self.base_url;
        let user: GithubUser = self
            .get_json(&format!("{base}/user/{github_id}"))
            .await?;
        Ok(user.login.filter(|l| !l.is_empty()))
    }

    /// Owned repositories of a user, split into top-by-stars and most-recent.
    pub async fn user_repos(&self, username: &str) -> Result<GithubProjects, GithubError> {
        let base = &self.base_url;
        let repos: Vec<RepoSummary> = self
            .get_json(&format!(
                "{base}/users/{username}/repos?per_page=100&sort=pushed&direction=desc"
            ))
            .await?;
        debug!("GitHub user {username}: {} repos", repos.len());
        Ok(rank_projects(username, repos))
    }

    /// Raw README text, truncated for summarization.
    pub async fn readme(&self, owner: &str, repo: &str) -> Result<String, GithubError> {
        let base = &self.base_url;
        let response = self
            .send(self.request(
                &format!("{base}/repos/{owner}/{repo}/readme"),
                "application/vnd.github.v3.raw",
            ))
            .await?;
        let text = response.text().await?;
        Ok(truncate_chars(&text, README_MAX_CHARS))
    }

    pub async fn search_repositories(
        &self,
        query: &str,
        per_page: u32,
    ) -> Result<Vec<SearchRepo>, GithubError> {
        let base = &self.base_url;
        let response: SearchResponse = self
            .get_json(&format!(
                "{base}/search/repositories?q={query}&sort=stars&order=desc&per_page={per_page}"
            ))
            .await?;
        Ok(response.items)
    }

    pub async fn contributors(
        &self,
        full_name: &str,
        per_page: usize,
    ) -> Result<Vec<Contributor>, GithubError> {
        let base = &self.base_url;
        let raw: Vec<RawContributor> = self
            .get_json(&format!(
                "{base}/repos/{full_name}/contributors?per_page={per_page}"
            ))
            .await?;
        Ok(raw
            .into_iter()
            .filter_map(|c| {
                Some(Contributor {
                    login: c.login?,
                    avatar_url: c.avatar_url,
                    contributions: c.contributions,
                    html_url: c.html_url,
                })
            })
            .take(per_page)
            .collect())
    }
}

fn rate_limit_remaining(headers: &HeaderMap) -> Option<u32> {
    headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u32>().ok())
}

/// 429 always; 403 only with an exhausted quota or a `retry-after` (secondary limit).
fn is_rate_limit_response(status: StatusCode, headers: &HeaderMap) -> bool {
    match status {
        StatusCode::TOO_MANY_REQUESTS => true,
        StatusCode::FORBIDDEN => {
            rate_limit_remaining(headers) == Some(0) || headers.contains_key("retry-after")
        }
        _ => false,
    }
}

/// Keeps repos owned by `username` (drops forks of other owners' repos that
/// GitHub lists under the user) and picks the top five by stars and by push time.
pub fn rank_projects(username: &str, repos: Vec<RepoSummary>) -> GithubProjects {
    let prefix = format!("{username}/");
    let owned: Vec<RepoSummary> = repos
        .into_iter()
        .filter(|r| r.full_name.starts_with(&prefix))
        .collect();

    let mut by_stars = owned.clone();
    by_stars.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count));
    by_stars.truncate(PROJECTS_PER_LIST);

    let mut by_recent = owned;
    by_recent.sort_by(|a, b| b.pushed_at.cmp(&a.pushed_at));
    by_recent.truncate(PROJECTS_PER_LIST);

    GithubProjects {
        top_by_stars: by_stars,
        most_recent: by_recent,
        username: Some(username.to_string()),
    }
}

/// Fallback username from Talent profile fields: `name` when it looks like a
/// GitHub login, else `relative_path` without its leading slash.
pub fn username_from_profile(name: Option<&str>, relative_path: Option<&str>) -> Option<String> {
    if let Some(name) = name.filter(|n| is_login(n)) {
        return Some(name.to_string());
    }
    relative_path
        .and_then(|p| p.strip_prefix('/'))
        .filter(|p| is_login(p))
        .map(String::from)
}

fn is_login(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
