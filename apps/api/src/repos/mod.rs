//! Mantle ecosystem repositories discovered through GitHub search.

pub mod handlers;

use std::collections::HashSet;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::github::{GithubClient, GithubError, SearchRepo};
use crate::models::MantleRepo;

pub const MANTLE_KEYWORDS: &[&str] = &[
    "mantle",
    "mnt",
    "mantle-network",
    "mantlenetwork",
    "mantle-chain",
    "mantle-testnet",
    "mantle-mainnet",
    "mantle-sdk",
    "mantle-bridge",
];

/// Search queries, limits and pacing for one discovery pass.
#[derive(Debug, Clone, Copy)]
pub struct DiscoveryPlan {
    pub queries: &'static [&'static str],
    pub per_page: u32,
    /// Repos kept after ranking, each with contributors attached.
    pub keep: usize,
    pub contributors_per_repo: usize,
    pub query_delay: Duration,
    pub contributor_delay: Duration,
}

/// Live fallback behind `GET /api/mantle-repos`.
pub const LIVE_PLAN: DiscoveryPlan = DiscoveryPlan {
    queries: &["mantle+blockchain", "mantle+network", "mantle+web3", "mantlenetwork"],
    per_page: 30,
    keep: 12,
    contributors_per_repo: 5,
    query_delay: Duration::from_millis(100),
    contributor_delay: Duration::from_millis(50),
};

/// Wider search used to populate the store.
pub const POPULATE_PLAN: DiscoveryPlan = DiscoveryPlan {
    queries: &[
        "mantle+blockchain",
        "mantle+network",
        "mantle+web3",
        "mantlenetwork",
        "mantle+ethereum",
        "mantle+defi",
        "mantle+smart+contract",
    ],
    per_page: 50,
    keep: 30,
    contributors_per_repo: 10,
    query_delay: Duration::from_millis(500),
    contributor_delay: Duration::from_millis(100),
};

/// Ranked repos from one pass. `found` counts every match before `keep` applies.
#[derive(Debug)]
pub struct Discovery {
    pub repos: Vec<MantleRepo>,
    pub found: usize,
}

/// A keyword contained in the name or description, or equal to a topic.
pub fn is_mantle_repo(repo: &SearchRepo) -> bool {
    let name = repo.name.to_lowercase();
    let description = repo.description.as_deref().unwrap_or_default().to_lowercase();
    let topics: Vec<String> = repo.topics.iter().map(|t| t.to_lowercase()).collect();

    MANTLE_KEYWORDS.iter().any(|keyword| {
        name.contains(keyword)
            || description.contains(keyword)
            || topics.iter().any(|t| t == keyword)
    })
}

pub fn from_search(repo: SearchRepo) -> MantleRepo {
    let (owner_username, owner_image_url) = match repo.owner {
        Some(owner) => (Some(owner.login), owner.avatar_url),
        None => (None, None),
    };
    MantleRepo {
        id: repo.id,
        github_id: Some(repo.id),
        name: repo.name,
        full_name: repo.full_name,
        html_url: repo.html_url,
        description: repo.description,
        language: repo.language,
        stargazers_count: repo.stargazers_count,
        forks_count: repo.forks_count,
        pushed_at: repo.pushed_at,
        topics: repo.topics,
        owner_display_name: owner_username.clone(),
        owner_username,
        owner_image_url,
        owner_profile_id: None,
        owner_builder_score: 0,
        contributors: Vec::new(),
    }
}

/// Appends unseen Mantle repos from one search page. Returns how many were added.
fn merge_results(
    repos: &mut Vec<MantleRepo>,
    seen: &mut HashSet<String>,
    items: Vec<SearchRepo>,
) -> usize {
    let before = repos.len();
    for item in items {
        if is_mantle_repo(&item) && seen.insert(item.full_name.clone()) {
            repos.push(from_search(item));
        }
    }
    repos.len() - before
}

fn sort_by_stars(repos: &mut [MantleRepo]) {
    repos.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count));
}

/// Runs every query of the plan, dedupes by `full_name`, keeps Mantle repos
/// and ranks them by stars. Fails only when every query failed.
pub async fn discover(github: &GithubClient, plan: &DiscoveryPlan) -> Result<Vec<MantleRepo>, GithubError> {
    let mut repos = Vec::new();
    let mut seen = HashSet::new();
    let mut last_error = None;
    let mut succeeded = 0;

    for (i, query) in plan.queries.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(plan.query_delay).await;
        }
        match github.search_repositories(query, plan.per_page).await {
            Ok(items) => {
                succeeded += 1;
                let added = merge_results(&mut repos, &mut seen, items);
                info!("Search {query}: {added} new repos (total: {})", repos.len());
            }
            Err(e) => {
                warn!("Search {query} failed: {e}");
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if succeeded == 0 => Err(e),
        _ => {
            sort_by_stars(&mut repos);
            Ok(repos)
        }
    }
}

/// Contributors for the first `limit` repos, at most `per_repo` each.
/// The rest are dropped. A failed lookup leaves the list empty.
pub async fn attach_contributors(
    github: &GithubClient,
    mut repos: Vec<MantleRepo>,
    limit: usize,
    per_repo: usize,
    delay: Duration,
) -> Vec<MantleRepo> {
    repos.truncate(limit);
    for (i, repo) in repos.iter_mut().enumerate() {
        if i > 0 {
            tokio::time::sleep(delay).await;
        }
        match github.contributors(&repo.full_name, per_repo).await {
            Ok(contributors) => {
                debug!("{}: {} contributors", repo.full_name, contributors.len());
                repo.contributors = contributors;
            }
            Err(e) => debug!("Contributors for {} unavailable: {e}", repo.full_name),
        }
    }
    repos
}

/// One full pass: discovery, ranking, then contributors for the kept repos.
pub async fn run_discovery(github: &GithubClient, plan: &DiscoveryPlan) -> Result<Discovery, GithubError> {
    let session = github.session();
    let repos = discover(&session, plan).await?;
    let found = repos.len();
    let repos = attach_contributors(
        &session,
        repos,
        plan.keep,
        plan.contributors_per_repo,
        plan.contributor_delay,
    )
    .await;
    info!("Discovered {found} Mantle repos, kept {}", repos.len());
    Ok(Discovery { repos, found })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::github::RepoOwner;
    use crate::test_server;

    const UNPACED_PLAN: DiscoveryPlan = DiscoveryPlan {
        queries: &["mantle+defi", "mantle+broken", "mantle+sdk"],
        per_page: 10,
        keep: 5,
        contributors_per_repo: 2,
        query_delay: Duration::ZERO,
        contributor_delay: Duration::ZERO,
    };

    /// Repository search that fails with a 500 for every query in `failing`.
    async fn search_stub(failing: &'static [&'static str]) -> GithubClient {
        let app = Router::new()
            .route(
                "/search/repositories",
                get(move |Query(params): Query<HashMap<String, String>>| async move {
                    let q = params.get("q").cloned().unwrap_or_default();
                    if failing.contains(&q.as_str()) {
                        return (StatusCode::INTERNAL_SERVER_ERROR, "search failed").into_response();
                    }
                    let slug = q.replace(' ', "-");
                    Json(json!({
                        "items": [
                            {
                                "id": 1,
                                "name": slug,
                                "full_name": format!("acme/{slug}"),
                                "html_url": format!("https://github.com/acme/{slug}"),
                                "stargazers_count": q.len(),
                                "owner": { "login": "acme" }
                            },
                            {
                                "id": 2,
                                "name": "shared-mantle-kit",
                                "full_name": "acme/shared-mantle-kit",
                                "html_url": "https://github.com/acme/shared-mantle-kit",
                                "stargazers_count": 50
                            },
                            {
                                "id": 3,
                                "name": "unrelated",
                                "full_name": "acme/unrelated",
                                "html_url": "https://github.com/acme/unrelated",
                                "stargazers_count": 500
                            }
                        ]
                    }))
                    .into_response()
                }),
            )
            .route(
                "/repos/:owner/:repo/contributors",
                get(|| async {
                    Json(json!([
                        { "login": "alice", "contributions": 12 },
                        { "login": "bob", "contributions": 3 },
                        { "login": "carol", "contributions": 1 }
                    ]))
                }),
            );
        GithubClient::new(None)
            .unwrap()
            .with_base_url(test_server::spawn(app).await)
    }

    fn search_repo(full_name: &str, description: Option<&str>, stars: i64) -> SearchRepo {
        let name = full_name.split('/').last().unwrap_or(full_name);
        SearchRepo {
            id: stars,
            name: name.to_string(),
            full_name: full_name.to_string(),
            html_url: format!("https://github.com/{full_name}"),
            description: description.map(String::from),
            language: None,
            stargazers_count: stars,
            forks_count: 0,
            pushed_at: None,
            topics: Vec::new(),
            owner: Some(RepoOwner {
                login: full_name.split('/').next().unwrap_or_default().to_string(),
                avatar_url: None,
            }),
        }
    }

    #[test]
    fn test_is_mantle_repo_by_name_and_description() {
        assert!(is_mantle_repo(&search_repo("acme/Mantle-SDK", None, 1)));
        assert!(is_mantle_repo(&search_repo(
            "acme/bridge",
            Some("Bridge assets to the MANTLE network"),
            1
        )));
        assert!(!is_mantle_repo(&search_repo("acme/bridge", Some("An L2 bridge"), 1)));
    }

    #[test]
    fn test_is_mantle_repo_topics_match_exactly() {
        let mut repo = search_repo("acme/dex", None, 1);
        repo.topics = vec!["defi".into(), "Mantle-Testnet".into()];
        assert!(is_mantle_repo(&repo));

        repo.topics = vec!["l2-tools".into()];
        assert!(!is_mantle_repo(&repo));
    }

    #[test]
    fn test_merge_results_dedupes_by_full_name() {
        let mut repos = Vec::new();
        let mut seen = HashSet::new();
        let first = vec![
            search_repo("acme/mantle-dex", None, 10),
            search_repo("acme/unrelated", Some("nothing here"), 99),
        ];
        assert_eq!(merge_results(&mut repos, &mut seen, first), 1);

        let second = vec![
            search_repo("acme/mantle-dex", None, 10),
            search_repo("other/mantle-nft", None, 40),
        ];
        assert_eq!(merge_results(&mut repos, &mut seen, second), 1);
        assert_eq!(repos.len(), 2);

        sort_by_stars(&mut repos);
        assert_eq!(repos[0].full_name, "other/mantle-nft");
    }

    #[test]
    fn test_from_search_copies_owner() {
        let repo = from_search(search_repo("mantlenetworkio/mantle", None, 900));
        assert_eq!(repo.github_id, Some(900));
        assert_eq!(repo.owner_username.as_deref(), Some("mantlenetworkio"));
        assert_eq!(repo.owner_display_name.as_deref(), Some("mantlenetworkio"));
        assert_eq!(repo.owner_builder_score, 0);
        assert!(repo.contributors.is_empty());
    }

    #[tokio::test]
    async fn test_discover_survives_failing_queries() {
        let github = search_stub(&["mantle broken"]).await;
        let repos = discover(&github, &UNPACED_PLAN).await.unwrap();
        let names: Vec<&str> = repos.iter().map(|r| r.full_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["acme/shared-mantle-kit", "acme/mantle-defi", "acme/mantle-sdk"]
        );
        assert!(!github.is_rate_limited());
    }

    #[tokio::test]
    async fn test_discover_fails_when_every_query_fails() {
        let github = search_stub(&["mantle defi", "mantle broken", "mantle sdk"]).await;
        let err = discover(&github, &UNPACED_PLAN).await.unwrap_err();
        assert!(matches!(err, GithubError::Status(500)));
    }

    #[tokio::test]
    async fn test_run_discovery_attaches_contributors() {
        let github = search_stub(&[]).await;
        let discovery = run_discovery(&github, &UNPACED_PLAN).await.unwrap();
        assert_eq!(discovery.found, 4);
        assert_eq!(discovery.repos.len(), 4);
        let top = &discovery.repos[0];
        assert_eq!(top.full_name, "acme/shared-mantle-kit");
        let logins: Vec<&str> = top.contributors.iter().map(|c| c.login.as_str()).collect();
        assert_eq!(logins, vec!["alice", "bob"]);
    }

    #[test]
    fn test_plans() {
        assert_eq!(LIVE_PLAN.queries.len(), 4);
        assert_eq!(POPULATE_PLAN.queries.len(), 7);
        assert!(POPULATE_PLAN.queries.starts_with(LIVE_PLAN.queries));
    }
}
