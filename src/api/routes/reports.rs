//! Report filing and collection task endpoints.

use crate::{
    api::{LimitQuery, SharedState},
    core::{
        collection,
        report::{self, CollectionTask, NewReport, ReportStatus},
    },
    entities::{collected_waste, report as report_entity},
    errors::Result,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

/// Body of `POST /reports`
#[derive(Debug, Deserialize)]
pub struct CreateReportRequest {
    /// Reporting user
    pub user_id: i64,
    /// Report fields
    #[serde(flatten)]
    pub report: NewReport,
}

/// Body of `POST /tasks/:id/status`
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// New status
    pub status: ReportStatus,
    /// Collector taking the task, if any
    #[serde(default)]
    pub collector_id: Option<i64>,
}

/// Body of `POST /tasks/:id/collect`
#[derive(Debug, Deserialize)]
pub struct CollectRequest {
    /// User who collected the waste
    pub collector_id: i64,
    /// Classifier output for the collection photo
    #[serde(default)]
    pub verification_result: Option<serde_json::Value>,
}

/// Files a report and credits the reporter.
pub async fn create_report(
    State(state): State<SharedState>,
    Json(request): Json<CreateReportRequest>,
) -> Result<(StatusCode, Json<report_entity::Model>)> {
    let created = report::create_report(
        &state.database,
        request.user_id,
        request.report,
        state.config.rewards.report_points,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Newest reports.
pub async fn recent_reports(
    State(state): State<SharedState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<report_entity::Model>>> {
    let limit = query.resolve(state.config.rewards.recent_reports_limit);
    Ok(Json(report::get_recent_reports(&state.database, limit).await?))
}

/// Collection task list.
pub async fn collection_tasks(
    State(state): State<SharedState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<CollectionTask>>> {
    let limit = query.resolve(state.config.rewards.task_limit);
    Ok(Json(
        report::get_waste_collection_tasks(&state.database, limit).await?,
    ))
}

/// Moves a task to a new status.
pub async fn update_status(
    State(state): State<SharedState>,
    Path(report_id): Path<i64>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<report_entity::Model>> {
    let updated = report::update_task_status(
        &state.database,
        report_id,
        request.status,
        request.collector_id,
    )
    .await?;
    Ok(Json(updated))
}

/// Records a verified collection.
pub async fn collect(
    State(state): State<SharedState>,
    Path(report_id): Path<i64>,
    Json(request): Json<CollectRequest>,
) -> Result<(StatusCode, Json<collected_waste::Model>)> {
    let saved = collection::save_collected_waste(
        &state.database,
        report_id,
        request.collector_id,
        request.verification_result,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// Collections recorded for a report, newest first.
pub async fn collections(
    State(state): State<SharedState>,
    Path(report_id): Path<i64>,
) -> Result<Json<Vec<collected_waste::Model>>> {
    Ok(Json(
        collection::get_collections_for_report(&state.database, report_id).await?,
    ))
}
