use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Only `DATABASE_URL` is required; every upstream key is optional and the
/// features that need it degrade or refuse at request time.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: Option<String>,
    pub talent_api_key: Option<String>,
    pub github_token: Option<String>,
    pub openai_api_key: Option<String>,
    pub sync_secret: Option<String>,
    pub cache_ttl_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: optional_env("REDIS_URL"),
            talent_api_key: optional_env("TALENT_API_KEY"),
            github_token: optional_env("GITHUB_TOKEN"),
            openai_api_key: optional_env("OPENAI_API_KEY"),
            sync_secret: optional_env("SYNC_SECRET"),
            cache_ttl_secs: std::env::var("CACHE_TTL_SECS")
                .unwrap_or_else(|_| "86400".to_string())
                .parse::<u64>()
                .context("CACHE_TTL_SECS must be a number of seconds")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Logs which optional upstream keys are present without leaking them.
    pub fn log_environment(&self) {
        tracing::info!("TALENT_API_KEY: {}", describe_secret(&self.talent_api_key));
        tracing::info!("GITHUB_TOKEN: {}", describe_secret(&self.github_token));
        tracing::info!("OPENAI_API_KEY: {}", describe_secret(&self.openai_api_key));
        tracing::info!("SYNC_SECRET: {}", describe_secret(&self.sync_secret));
        if self.github_token.is_none() {
            tracing::warn!("GITHUB_TOKEN not configured - GitHub API will have lower rate limits");
        }
        if self.openai_api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY not configured - using simple summaries instead of AI");
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// "set (abcdefgh...)" or "not set". Never shows more than 8 characters.
pub fn describe_secret(value: &Option<String>) -> String {
    match value {
        Some(v) => {
            let prefix: String = v.chars().take(8).collect();
            format!("set ({prefix}...)")
        }
        None => "not set".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_secret_truncates() {
        let key = Some("tp_live_1234567890".to_string());
        assert_eq!(describe_secret(&key), "set (tp_live_...)");
    }

    #[test]
    fn test_describe_secret_short_value() {
        assert_eq!(describe_secret(&Some("abc".to_string())), "set (abc...)");
    }

    #[test]
    fn test_describe_secret_missing() {
        assert_eq!(describe_secret(&None), "not set");
    }
}
