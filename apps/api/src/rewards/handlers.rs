use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{
    describe_split, parse_wei, plan, top_builders, DistributionPlan, RankedBuilder, Split,
    REWARDED_BUILDERS,
};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct PoolQuery {
    pub pool_wei: Option<String>,
}

impl PoolQuery {
    fn pool(&self) -> Result<Option<u128>, AppError> {
        self.pool_wei
            .as_deref()
            .map(|raw| {
                parse_wei(raw).ok_or_else(|| {
                    AppError::Validation(format!("pool_wei must be a non-negative integer, got {raw:?}"))
                })
            })
            .transpose()
    }
}

#[derive(Serialize)]
pub struct TopBuildersResponse {
    pub builders: Vec<RankedBuilder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<DistributionPlan>,
}

/// GET /api/rewards/distribution
pub async fn handle_distribution(Query(params): Query<PoolQuery>) -> Result<Json<Split>, AppError> {
    let pool = params
        .pool()?
        .ok_or_else(|| AppError::Validation("pool_wei is required".to_string()))?;
    Ok(Json(describe_split(pool)))
}

/// GET /api/rewards/top-builders
pub async fn handle_top_builders(
    State(state): State<AppState>,
    Query(params): Query<PoolQuery>,
) -> Result<Json<TopBuildersResponse>, AppError> {
    let pool = params.pool()?;
    let builders = top_builders(&state.db, state.talent.as_ref(), REWARDED_BUILDERS).await?;
    let distribution = pool.map(|pool| plan(pool, &builders));
    Ok(Json(TopBuildersResponse {
        builders,
        plan: distribution,
    }))
}
