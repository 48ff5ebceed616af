//! Reward listing, earning, redemption and leaderboard endpoints.

use crate::{
    api::SharedState,
    core::reward::{self, AvailableReward, LeaderboardEntry},
    entities::reward as reward_entity,
    errors::Result,
};
use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

/// Body of `POST /users/:id/rewards/earn`
#[derive(Debug, Deserialize)]
pub struct EarnRequest {
    /// Points to credit
    pub amount: i64,
}

/// Rewards the user can redeem, own points first.
pub async fn available_rewards(
    State(state): State<SharedState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<AvailableReward>>> {
    Ok(Json(
        reward::get_available_rewards(&state.database, user_id).await?,
    ))
}

/// Credits collection points.
pub async fn earn(
    State(state): State<SharedState>,
    Path(user_id): Path<i64>,
    Json(request): Json<EarnRequest>,
) -> Result<Json<reward_entity::Model>> {
    Ok(Json(
        reward::save_reward(&state.database, user_id, request.amount).await?,
    ))
}

/// Redeems a catalog reward, or all points for reward id 0.
pub async fn redeem(
    State(state): State<SharedState>,
    Path((user_id, reward_id)): Path<(i64, i64)>,
) -> Result<Json<reward_entity::Model>> {
    Ok(Json(
        reward::redeem_reward(&state.database, user_id, reward_id).await?,
    ))
}

/// Points leaderboard.
pub async fn leaderboard(State(state): State<SharedState>) -> Result<Json<Vec<LeaderboardEntry>>> {
    Ok(Json(
        reward::get_all_rewards(&state.database, state.config.rewards.level_step).await?,
    ))
}
