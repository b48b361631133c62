pub mod profile;
pub mod repo;

pub use profile::{
    GithubProjects, GithubStats, OnchainStats, Profile, ProfileRow, RecentProject, RepoSummary,
};
pub use repo::{Contributor, ContributorRow, MantleRepo, MantleRepoRow};
