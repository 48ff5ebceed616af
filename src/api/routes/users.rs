//! User, balance and notification endpoints.

use crate::{
    api::SharedState,
    core::{
        notification,
        transaction::{self, TransactionEntry},
        user,
    },
    entities::{notification as notification_entity, user as user_entity},
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

/// Body of `POST /users`
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Email from the auth provider
    pub email: String,
    /// Display name, optional
    #[serde(default)]
    pub name: Option<String>,
}

/// Body returned by the balance endpoint
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceResponse {
    /// User the balance belongs to
    pub user_id: i64,
    /// Points available, never negative
    pub balance: i64,
}

/// Registers the signed-in user, or returns the existing record.
pub async fn create_user(
    State(state): State<SharedState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<user_entity::Model>> {
    let name = request.name.unwrap_or_default();
    let created = user::create_user(&state.database, &request.email, &name).await?;
    Ok(Json(created))
}

/// Looks a user up by email.
pub async fn get_user_by_email(
    State(state): State<SharedState>,
    Path(email): Path<String>,
) -> Result<Json<user_entity::Model>> {
    user::get_user_by_email(&state.database, &email)
        .await?
        .map(Json)
        .ok_or(Error::UnknownEmail { email })
}

/// Current points balance derived from the ledger.
pub async fn get_balance(
    State(state): State<SharedState>,
    Path(user_id): Path<i64>,
) -> Result<Json<BalanceResponse>> {
    let balance = transaction::get_user_balance(&state.database, user_id).await?;
    Ok(Json(BalanceResponse { user_id, balance }))
}

/// Unread notifications, polled by clients.
pub async fn get_unread_notifications(
    State(state): State<SharedState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<notification_entity::Model>>> {
    let unread = notification::get_unread_notifications(&state.database, user_id).await?;
    Ok(Json(unread))
}

/// Recent ledger entries.
pub async fn get_transactions(
    State(state): State<SharedState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<TransactionEntry>>> {
    let history = transaction::get_reward_transactions(
        &state.database,
        user_id,
        state.config.rewards.history_limit,
    )
    .await?;
    Ok(Json(history))
}

/// Dismisses a notification.
pub async fn mark_notification_read(
    State(state): State<SharedState>,
    Path(notification_id): Path<i64>,
) -> Result<Json<notification_entity::Model>> {
    let updated = notification::mark_notification_as_read(&state.database, notification_id).await?;
    Ok(Json(updated))
}
