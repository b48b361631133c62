//! Leaderboard aggregation: finds profiles on Talent Protocol, joins their
//! data points, resolves GitHub accounts and repositories, summarizes each
//! builder's most recent project, and ranks by builder score.
//!
//! Individual upstream failures are logged and skipped; the pipeline always
//! produces a (possibly partial) leaderboard.

use std::collections::HashSet;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, info};
use uuid::Uuid;

use crate::github::{truncate_chars, username_from_profile, GithubClient};
use crate::models::{GithubProjects, Profile, RecentProject, RepoSummary};
use crate::talent::seeds::{ENS_NAMES, WALLET_ADDRESSES};
use crate::talent::slugs::MANTLE_CREDENTIAL_SLUG;
use crate::talent::{DataPoints, SearchQuery, TalentClient, TalentProfile};

pub mod summary;

pub use summary::Summarizer;

/// Upstream requests in flight per step.
const CONCURRENCY: usize = 8;
const STORED_README_CHARS: usize = 500;

pub struct PipelineOutput {
    pub profiles: Vec<Profile>,
    pub github_rate_limited: bool,
}

/// Profiles in discovery order, each id admitted once.
#[derive(Default)]
pub struct Roster {
    seen: HashSet<Uuid>,
    profiles: Vec<Profile>,
}

impl Roster {
    /// Adds the profile unless its id is already present. Returns whether it was added.
    pub fn admit(&mut self, profile: Profile) -> bool {
        if self.seen.insert(profile.id) {
            self.profiles.push(profile);
            true
        } else {
            false
        }
    }

    /// Admits every convertible Talent profile, tagging each with `tag`. Returns the number added.
    pub fn admit_all(
        &mut self,
        found: impl IntoIterator<Item = TalentProfile>,
        tag: impl Fn(&mut Profile),
    ) -> usize {
        found
            .into_iter()
            .filter_map(TalentProfile::into_profile)
            .fold(0, |added, mut p| {
                tag(&mut p);
                added + usize::from(self.admit(p))
            })
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn into_profiles(self) -> Vec<Profile> {
        self.profiles
    }
}

/// Runs every step against the live APIs.
pub async fn build_leaderboard(
    talent: &TalentClient,
    github: &GithubClient,
    summarizer: &Summarizer,
) -> PipelineOutput {
    let github = github.session();
    let mut roster = Roster::default();

    info!("[1/7] Searching profiles by wallet addresses...");
    let wallets = SearchQuery::Wallets(WALLET_ADDRESSES.iter().map(|w| w.to_string()).collect());
    let found = talent.search_all(&wallets).await;
    roster.admit_all(found, |_| {});
    info!("Found {} profiles from wallet search", roster.len());

    info!("[2/7] Searching profiles by ENS identity...");
    let ens_names: Vec<String> = ENS_NAMES.iter().map(|ens| ens.to_string()).collect();
    let identities: Vec<(String, Option<TalentProfile>)> =
        stream::iter(ens_names)
            .map(|ens| search_identity(talent.clone(), ens))
            .buffered(CONCURRENCY)
            .collect()
            .await;
    for (ens, found) in identities {
        roster.admit_all(found, |p| p.searched_identity = Some(ens.clone()));
    }
    info!("Total profiles after ENS search: {}", roster.len());

    info!("[3/7] Searching profiles with Mantle ecosystem commits credential...");
    let credential = SearchQuery::Credential {
        slug: MANTLE_CREDENTIAL_SLUG.to_string(),
        min: 1,
    };
    let found = talent.search_all(&credential).await;
    let added = roster.admit_all(found, |p| p.has_mantle_credential = true);
    info!(
        "Found {added} new profiles with Mantle ecosystem commits (total: {})",
        roster.len()
    );

    let profiles = roster.into_profiles();

    info!("[4/7] Fetching data points for all profiles...");
    let profiles: Vec<Profile> = stream::iter(profiles)
        .map(|profile| attach_data_points(talent.clone(), profile))
        .buffered(CONCURRENCY)
        .collect()
        .await;
    let counts = Coverage::of(&profiles);
    info!(
        "{} with GitHub data, {} with GitHub user ids, {} with onchain data, {} with Mantle commits",
        counts.github_stats, counts.github_ids, counts.onchain, counts.mantle_commits
    );

    info!("[5/7] Fetching GitHub repositories...");
    let profiles: Vec<Profile> = stream::iter(profiles)
        .map(|profile| attach_repositories(github.clone(), profile))
        .buffered(CONCURRENCY)
        .collect()
        .await;
    info!(
        "{} profiles have GitHub repositories",
        Coverage::of(&profiles).repos
    );

    info!("[6/7] Fetching READMEs and generating summaries...");
    let mut profiles: Vec<Profile> = stream::iter(profiles)
        .map(|profile| attach_recent_project(github.clone(), summarizer.clone(), profile))
        .buffered(CONCURRENCY)
        .collect()
        .await;
    info!(
        "{} profiles have project summaries",
        Coverage::of(&profiles).summaries
    );

    info!("[7/7] Sorting and finalizing...");
    sort_by_score(&mut profiles);
    for (i, p) in profiles.iter().take(10).enumerate() {
        info!(
            "{}. {} (score {}) commits={} contributions={}",
            i + 1,
            p.label(),
            p.builder_score,
            p.github_stats.total_commits.as_deref().unwrap_or("-"),
            p.github_stats.total_contributions.as_deref().unwrap_or("-"),
        );
    }

    PipelineOutput {
        profiles,
        github_rate_limited: github.is_rate_limited(),
    }
}

async fn search_identity(talent: TalentClient, ens: String) -> (String, Option<TalentProfile>) {
    let found = match talent.search_identity(&ens).await {
        Ok(found) => found,
        Err(e) => {
            debug!("Identity search for {ens} failed: {e}");
            None
        }
    };
    (ens, found)
}

async fn attach_data_points(talent: TalentClient, mut profile: Profile) -> Profile {
    match talent.data_points(&profile.id.to_string()).await {
        Ok(dp) => apply_data_points(&mut profile, dp),
        Err(e) => debug!("Data points for {} failed: {e}", profile.id),
    }
    profile
}

async fn attach_repositories(github: GithubClient, mut profile: Profile) -> Profile {
    resolve_github_username(&github, &mut profile).await;
    profile.github_projects = match profile.github_username.clone() {
        Some(username) => match github.user_repos(&username).await {
            Ok(projects) => projects,
            Err(e) => {
                debug!("Repos for {username} failed: {e}");
                GithubProjects {
                    username: Some(username),
                    ..Default::default()
                }
            }
        },
        None => GithubProjects::default(),
    };
    profile
}

async fn attach_recent_project(
    github: GithubClient,
    summarizer: Summarizer,
    mut profile: Profile,
) -> Profile {
    let (Some(username), Some(repo)) = (
        profile.github_username.clone(),
        profile.github_projects.most_recent.first().cloned(),
    ) else {
        return profile;
    };
    let readme = match github.readme(&username, &repo.name).await {
        Ok(readme) => Some(readme),
        Err(e) => {
            debug!("README for {username}/{} unavailable: {e}", repo.name);
            None
        }
    };
    let ai_summary = summarizer.summarize(readme.as_deref(), &repo.name).await;
    profile.recent_project = Some(recent_project(&repo, readme, ai_summary));
    profile
}

async fn resolve_github_username(github: &GithubClient, profile: &mut Profile) {
    if let Some(github_id) = profile.github_user_id.as_deref() {
        match github.username_for_id(github_id).await {
            Ok(Some(username)) => {
                profile.github_username = Some(username);
                return;
            }
            Ok(None) => {}
            Err(e) => debug!("GitHub user {github_id} lookup failed: {e}"),
        }
    }
    profile.github_username =
        username_from_profile(profile.name.as_deref(), profile.relative_path.as_deref());
}

pub fn apply_data_points(profile: &mut Profile, dp: DataPoints) {
    profile.github_stats = dp.github_stats;
    profile.onchain_stats = dp.onchain_stats;
    profile.github_user_id = dp.github_user_id;
    profile.builder_earnings = dp.builder_earnings;
}

pub fn recent_project(
    repo: &RepoSummary,
    readme: Option<String>,
    ai_summary: Option<String>,
) -> RecentProject {
    RecentProject {
        name: repo.name.clone(),
        full_name: repo.full_name.clone(),
        description: repo.description.clone(),
        html_url: repo.html_url.clone(),
        language: repo.language.clone(),
        stars: repo.stargazers_count,
        pushed_at: repo.pushed_at,
        readme: readme.map(|r| truncate_chars(&r, STORED_README_CHARS)),
        ai_summary,
    }
}

/// Highest builder score first; ties keep discovery order.
pub fn sort_by_score(profiles: &mut [Profile]) {
    profiles.sort_by(|a, b| b.builder_score.cmp(&a.builder_score));
}

/// How many profiles carry each kind of joined data.
#[derive(Debug, Default, PartialEq)]
pub struct Coverage {
    pub github_stats: usize,
    pub github_ids: usize,
    pub onchain: usize,
    pub mantle_commits: usize,
    pub repos: usize,
    pub summaries: usize,
}

impl Coverage {
    pub fn of(profiles: &[Profile]) -> Self {
        let mut c = Coverage::default();
        for p in profiles {
            c.github_stats += usize::from(p.github_stats.has_any());
            c.github_ids += usize::from(p.github_user_id.is_some());
            c.onchain += usize::from(p.onchain_stats.has_any());
            c.mantle_commits += usize::from(p.github_stats.mantle_eco_commits.is_some());
            c.repos += usize::from(!p.github_projects.is_empty());
            c.summaries += usize::from(
                p.recent_project
                    .as_ref()
                    .is_some_and(|r| r.ai_summary.is_some()),
            );
        }
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::fixtures::{profile, repo};
    use serde_json::json;

    fn talent(id: u128, score: i64) -> TalentProfile {
        serde_json::from_value(json!({
            "id": Uuid::from_u128(id).to_string(),
            "display_name": format!("builder-{id}"),
            "score": score
        }))
        .unwrap()
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn test_build_leaderboard_future_is_send() {
        let talent = TalentClient::new("key".to_string()).unwrap();
        let github = GithubClient::new(None).unwrap();
        let summarizer = Summarizer::default();
        let run = build_leaderboard(&talent, &github, &summarizer);
        assert_send(&run);
    }

    #[test]
    fn test_roster_dedupes_by_id() {
        let mut roster = Roster::default();
        assert!(roster.admit(profile(1, 10)));
        assert!(!roster.admit(profile(1, 99)));
        assert!(roster.admit(profile(2, 5)));
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.into_profiles()[0].builder_score, 10);
    }

    #[test]
    fn test_admit_all_tags_only_new_profiles() {
        let mut roster = Roster::default();
        roster.admit_all(vec![talent(1, 10)], |_| {});
        let added = roster.admit_all(vec![talent(1, 10), talent(2, 20)], |p| {
            p.has_mantle_credential = true
        });
        assert_eq!(added, 1);

        let profiles = roster.into_profiles();
        assert!(!profiles[0].has_mantle_credential);
        assert!(profiles[1].has_mantle_credential);
    }

    #[test]
    fn test_admit_all_skips_invalid_ids() {
        let mut roster = Roster::default();
        let bad: TalentProfile = serde_json::from_value(json!({ "id": "legacy-42" })).unwrap();
        assert_eq!(roster.admit_all(vec![bad], |_| {}), 0);
        assert!(roster.is_empty());
    }

    #[test]
    fn test_sort_by_score_is_stable() {
        let mut profiles = vec![profile(1, 10), profile(2, 30), profile(3, 10), profile(4, 20)];
        sort_by_score(&mut profiles);
        let ids: Vec<u128> = profiles.iter().map(|p| p.id.as_u128()).collect();
        assert_eq!(ids, vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_apply_data_points() {
        let mut p = profile(1, 10);
        let mut dp = DataPoints::default();
        dp.assign("github_total_commits", Some("812".to_string()));
        dp.assign("talent_builder_rewards_total_usd", Some("$1,250".to_string()));
        dp.github_user_id = Some("424242".to_string());

        apply_data_points(&mut p, dp);
        assert_eq!(p.github_stats.total_commits.as_deref(), Some("812"));
        assert_eq!(p.builder_earnings.as_deref(), Some("$1,250"));
        assert_eq!(p.github_user_id.as_deref(), Some("424242"));
    }

    #[test]
    fn test_recent_project_truncates_readme() {
        let r = repo("fresh", 4, "2024-06-01T00:00:00Z");
        let project = recent_project(&r, Some("x".repeat(2000)), Some("summary".to_string()));
        assert_eq!(project.readme.as_ref().map(|s| s.len()), Some(500));
        assert_eq!(project.stars, 4);
        assert_eq!(project.full_name, "alice/fresh");
    }

    #[test]
    fn test_coverage_counts() {
        let mut with_data = profile(1, 1);
        with_data.github_user_id = Some("1".to_string());
        with_data.github_stats.mantle_eco_commits = Some("3".to_string());
        with_data.github_projects.top_by_stars = vec![repo("a", 1, "2024-01-01T00:00:00Z")];

        let c = Coverage::of(&[with_data, profile(2, 2)]);
        assert_eq!(
            c,
            Coverage {
                github_stats: 1,
                github_ids: 1,
                onchain: 0,
                mantle_commits: 1,
                repos: 1,
                summaries: 0,
            }
        );
    }
}
