//! Collection business logic - Recording verified pickups of reported waste.

use crate::{
    core::{
        report::{self, ReportStatus},
        user,
    },
    entities::{CollectedWaste, collected_waste},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Records that `collector_id` picked up the waste from `report_id`.
///
/// The record is stored as `verified` with the classifier output for the
/// collection photo.
pub async fn save_collected_waste(
    db: &DatabaseConnection,
    report_id: i64,
    collector_id: i64,
    verification_result: Option<serde_json::Value>,
) -> Result<collected_waste::Model> {
    report::get_report_by_id(db, report_id)
        .await?
        .ok_or(Error::ReportNotFound { id: report_id })?;
    user::require_user(db, collector_id).await?;

    let model = collected_waste::ActiveModel {
        report_id: Set(report_id),
        collector_id: Set(collector_id),
        collection_date: Set(chrono::Utc::now()),
        status: Set(ReportStatus::Verified.as_str().to_string()),
        verification_result: Set(verification_result),
        ..Default::default()
    };

    let saved = model.insert(db).await?;
    info!("Collector {} verified report {}", collector_id, report_id);
    Ok(saved)
}

/// All collections recorded for a report, newest first.
pub async fn get_collections_for_report(
    db: &DatabaseConnection,
    report_id: i64,
) -> Result<Vec<collected_waste::Model>> {
    CollectedWaste::find()
        .filter(collected_waste::Column::ReportId.eq(report_id))
        .order_by_desc(collected_waste::Column::CollectionDate)
        .all(db)
        .await
        .map_err(Into::into)
}
