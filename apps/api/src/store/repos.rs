use std::collections::HashMap;

use sqlx::PgPool;
use tracing::info;

use crate::models::{Contributor, ContributorRow, MantleRepo, MantleRepoRow};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReplaceCounts {
    pub repos: usize,
    pub contributors: usize,
}

pub async fn list_mantle_repos(pool: &PgPool, limit: i64) -> Result<Vec<MantleRepoRow>, sqlx::Error> {
    sqlx::query_as::<_, MantleRepoRow>(
        "SELECT * FROM mantle_repos ORDER BY stargazers_count DESC, id LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn contributors_for(
    pool: &PgPool,
    repo_ids: &[i32],
) -> Result<Vec<ContributorRow>, sqlx::Error> {
    if repo_ids.is_empty() {
        return Ok(Vec::new());
    }
    sqlx::query_as::<_, ContributorRow>(
        "SELECT * FROM mantle_contributors WHERE repo_id = ANY($1) \
         ORDER BY repo_id, contributions DESC, id",
    )
    .bind(repo_ids)
    .fetch_all(pool)
    .await
}

/// Stored repos with up to `per_repo` contributors each, most stars first.
pub async fn mantle_repos_with_contributors(
    pool: &PgPool,
    limit: i64,
    per_repo: usize,
) -> Result<Vec<MantleRepo>, sqlx::Error> {
    let rows = list_mantle_repos(pool, limit).await?;
    let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
    let contributors = contributors_for(pool, &ids).await?;
    Ok(attach_contributors(rows, contributors, per_repo))
}

fn attach_contributors(
    rows: Vec<MantleRepoRow>,
    contributors: Vec<ContributorRow>,
    per_repo: usize,
) -> Vec<MantleRepo> {
    let mut by_repo: HashMap<i32, Vec<Contributor>> = HashMap::new();
    for row in contributors {
        let list = by_repo.entry(row.repo_id).or_default();
        if list.len() < per_repo {
            list.push(row.into());
        }
    }
    rows.into_iter()
        .map(|row| {
            let contributors = by_repo.remove(&row.id).unwrap_or_default();
            MantleRepo::from_row(row, contributors)
        })
        .collect()
}

fn clamp_i32(n: i64) -> i32 {
    n.clamp(0, i64::from(i32::MAX)) as i32
}

/// Replaces the stored repository set in one transaction, then links owners
/// to stored profiles by GitHub username.
pub async fn replace_mantle_repos(
    pool: &PgPool,
    repos: &[MantleRepo],
) -> Result<ReplaceCounts, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM mantle_contributors")
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM mantle_repos")
        .execute(&mut *tx)
        .await?;

    let mut counts = ReplaceCounts::default();
    for repo in repos {
        let (repo_id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO mantle_repos (
                github_id, name, full_name, html_url, description, language,
                stargazers_count, forks_count, pushed_at, topics,
                owner_username, owner_display_name, owner_image_url, owner_builder_score
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id
            "#,
        )
        .bind(repo.github_id)
        .bind(&repo.name)
        .bind(&repo.full_name)
        .bind(&repo.html_url)
        .bind(&repo.description)
        .bind(&repo.language)
        .bind(clamp_i32(repo.stargazers_count))
        .bind(clamp_i32(repo.forks_count))
        .bind(repo.pushed_at)
        .bind(&repo.topics)
        .bind(&repo.owner_username)
        .bind(&repo.owner_display_name)
        .bind(&repo.owner_image_url)
        .bind(repo.owner_builder_score)
        .fetch_one(&mut *tx)
        .await?;
        counts.repos += 1;

        for c in &repo.contributors {
            sqlx::query(
                "INSERT INTO mantle_contributors (repo_id, login, avatar_url, contributions, html_url) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(repo_id)
            .bind(&c.login)
            .bind(&c.avatar_url)
            .bind(clamp_i32(c.contributions))
            .bind(&c.html_url)
            .execute(&mut *tx)
            .await?;
            counts.contributors += 1;
        }
    }

    let linked = sqlx::query(
        r#"
        UPDATE mantle_repos r
        SET owner_profile_id = p.id,
            owner_display_name = COALESCE(p.display_name, r.owner_display_name),
            owner_image_url = COALESCE(p.image_url, r.owner_image_url),
            owner_builder_score = p.builder_score
        FROM profiles p
        WHERE p.github_username IS NOT NULL
          AND lower(p.github_username) = lower(r.owner_username)
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    info!(
        "Stored {} repos with {} contributors ({} linked to profiles)",
        counts.repos,
        counts.contributors,
        linked.rows_affected()
    );
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(id: i32, name: &str) -> MantleRepoRow {
        MantleRepoRow {
            id,
            github_id: Some(i64::from(id) * 100),
            name: name.to_string(),
            full_name: format!("mantle/{name}"),
            html_url: format!("https://github.com/mantle/{name}"),
            description: None,
            language: Some("Solidity".to_string()),
            stargazers_count: 10,
            forks_count: 1,
            pushed_at: None,
            topics: vec!["mantle".to_string()],
            owner_username: Some("mantle".to_string()),
            owner_display_name: None,
            owner_image_url: None,
            owner_profile_id: None,
            owner_builder_score: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn contributor(id: i32, repo_id: i32, contributions: i32) -> ContributorRow {
        ContributorRow {
            id,
            repo_id,
            login: format!("dev{id}"),
            avatar_url: None,
            contributions,
            html_url: None,
        }
    }

    #[test]
    fn test_attach_contributors_caps_per_repo() {
        let rows = vec![row(1, "sdk"), row(2, "bridge")];
        let contributors = vec![
            contributor(1, 1, 90),
            contributor(2, 1, 50),
            contributor(3, 1, 10),
            contributor(4, 2, 7),
        ];
        let repos = attach_contributors(rows, contributors, 2);
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].contributors.len(), 2);
        assert_eq!(repos[0].contributors[0].login, "dev1");
        assert_eq!(repos[1].contributors.len(), 1);
        assert_eq!(repos[1].contributors[0].contributions, 7);
    }

    #[test]
    fn test_repo_without_contributors() {
        let repos = attach_contributors(vec![row(3, "docs")], Vec::new(), 5);
        assert!(repos[0].contributors.is_empty());
        assert_eq!(repos[0].id, 3);
    }

    #[test]
    fn test_clamp_i32() {
        assert_eq!(clamp_i32(42), 42);
        assert_eq!(clamp_i32(i64::MAX), i32::MAX);
        assert_eq!(clamp_i32(-5), 0);
        assert_eq!(clamp_i32(i64::MIN), 0);
        assert_eq!(clamp_i32(i64::from(i32::MIN)), 0);
        assert_eq!(clamp_i32(i64::from(i32::MIN) - 1), 0);
        assert_eq!(clamp_i32(i64::from(i32::MAX) + 1), i32::MAX);
    }
}
