use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use leaderboard_api::config::Config;
use leaderboard_api::db::create_pool;
use leaderboard_api::routes::build_router;
use leaderboard_api::state::AppState;
use leaderboard_api::{cache, init_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    init_tracing(&config.rust_log);

    info!("Starting Mantle Leaderboard API v{}", env!("CARGO_PKG_VERSION"));
    config.log_environment();

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize profiles cache (Redis when REDIS_URL is set)
    let cache = cache::from_url(
        config.redis_url.as_deref(),
        Duration::from_secs(config.cache_ttl_secs),
    )?;

    // Build app state
    let state = AppState::new(config.clone(), db, cache)?;
    info!(
        "Upstream clients ready (talent: {}, AI summaries: {})",
        state.talent.is_some(),
        state.summarizer.uses_ai()
    );

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
