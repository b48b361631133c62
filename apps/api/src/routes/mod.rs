pub mod health;

use axum::{routing::get, Router};

use crate::leaderboard::handlers as leaderboard;
use crate::repos::handlers as repos;
use crate::rewards::handlers as rewards;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Leaderboard
        .route("/api/profiles", get(leaderboard::handle_list_profiles))
        .route("/api/profiles/:id", get(leaderboard::handle_get_profile))
        .route(
            "/api/sync",
            get(leaderboard::handle_sync_status).post(leaderboard::handle_sync),
        )
        // Ecosystem
        .route("/api/mantle-repos", get(repos::handle_mantle_repos))
        // Rewards
        .route(
            "/api/rewards/distribution",
            get(rewards::handle_distribution),
        )
        .route(
            "/api/rewards/top-builders",
            get(rewards::handle_top_builders),
        )
        .with_state(state)
}
