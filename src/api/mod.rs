//! HTTP API.
//!
//! Thin axum handlers over the core operations. Handlers return
//! [`crate::errors::Result`]; [`error`] maps failures to status codes.

pub mod error;
pub mod routes;

use crate::{
    config::AppConfig,
    services::{GeminiClient, Geocoder, Verifier},
};
use axum::{
    Json, Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use routes::{reports, rewards, users, verification};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::{sync::Arc, time::Duration};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Largest page size a client may request.
pub const MAX_LIMIT: u64 = 100;

/// Everything a handler needs, shared across requests.
pub struct AppState {
    /// Database connection pool
    pub database: DatabaseConnection,
    /// Loaded configuration
    pub config: AppConfig,
    /// Image classifier, absent when no API key is configured
    pub verifier: Option<Verifier<GeminiClient>>,
    /// Location autocomplete client
    pub geocoder: Geocoder,
}

/// State handle passed to handlers.
pub type SharedState = Arc<AppState>;

/// Optional `?limit=` query parameter.
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    /// Requested page size
    #[serde(default)]
    pub limit: Option<u64>,
}

impl LimitQuery {
    /// Requested limit clamped to `1..=MAX_LIMIT`, or `default` when absent.
    pub fn resolve(&self, default: u64) -> u64 {
        self.limit.unwrap_or(default).clamp(1, MAX_LIMIT)
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Builds the application router.
pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any)
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/health", get(health))
        .route("/users", post(users::create_user))
        .route("/users/by-email/:email", get(users::get_user_by_email))
        .route("/users/:id/balance", get(users::get_balance))
        .route("/users/:id/notifications", get(users::get_unread_notifications))
        .route("/users/:id/transactions", get(users::get_transactions))
        .route("/users/:id/rewards", get(rewards::available_rewards))
        .route("/users/:id/rewards/earn", post(rewards::earn))
        .route("/users/:id/rewards/:reward_id/redeem", post(rewards::redeem))
        .route("/notifications/:id/read", post(users::mark_notification_read))
        .route("/reports", post(reports::create_report))
        .route("/reports/recent", get(reports::recent_reports))
        .route("/tasks", get(reports::collection_tasks))
        .route("/tasks/:id/status", post(reports::update_status))
        .route("/tasks/:id/collect", post(reports::collect))
        .route("/tasks/:id/collections", get(reports::collections))
        .route("/verify", post(verification::verify))
        .route("/locations", get(verification::search_locations))
        .route("/leaderboard", get(rewards::leaderboard))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
