//! Mantle builder leaderboard: Talent Protocol profiles joined with GitHub
//! activity and AI project summaries, cached and stored in Postgres, plus the
//! Mantle repository directory and the top-ten reward split.

pub mod cache;
pub mod config;
pub mod db;
pub mod errors;
pub mod github;
pub mod leaderboard;
pub mod llm_client;
pub mod models;
pub mod pipeline;
pub mod repos;
pub mod rewards;
pub mod routes;
pub mod state;
pub mod store;
pub mod talent;

#[cfg(test)]
pub(crate) mod test_server;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Structured logging. `RUST_LOG` in the environment wins; otherwise this
/// crate and the HTTP trace layer log at `default_level`.
pub fn init_tracing(default_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={default_level},tower_http={default_level}",
                env!("CARGO_CRATE_NAME")
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
