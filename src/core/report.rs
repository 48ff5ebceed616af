//! Report business logic - Filing waste reports and moving them through collection.
//!
//! Filing a report is the main way users earn points: the report, the points
//! credit, the ledger entry and the notification are written in one database
//! transaction so a report never exists without its reward.

use crate::{
    core::{
        notification::{self, REWARD_KIND},
        reward,
        transaction::{self, TransactionKind},
        user,
    },
    entities::{Report, report},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tracing::{info, instrument};

/// Where a report is in the collection workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Filed, waiting for a collector
    Pending,
    /// A collector has claimed it
    InProgress,
    /// Picked up
    Completed,
    /// Pickup confirmed by the classifier
    Verified,
}

impl ReportStatus {
    /// The value stored in the `status` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Verified => "verified",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "verified" => Ok(Self::Verified),
            other => Err(Error::Validation {
                message: format!("Unknown report status: {other}"),
            }),
        }
    }
}

/// Fields supplied when filing a report.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewReport {
    /// Where the waste is
    pub location: String,
    /// Waste category, usually from the classifier
    pub waste_type: String,
    /// Quantity with unit, usually from the classifier
    pub amount: String,
    /// Image reference
    #[serde(default)]
    pub image_url: Option<String>,
    /// Raw classifier output
    #[serde(default)]
    pub verification_result: Option<serde_json::Value>,
}

impl NewReport {
    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("location", &self.location),
            ("waste_type", &self.waste_type),
            ("amount", &self.amount),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Validation {
                    message: format!("Report {field} cannot be empty"),
                });
            }
        }
        Ok(())
    }
}

/// A report as shown on the collection task list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionTask {
    /// The underlying report
    #[serde(flatten)]
    pub report: report::Model,
    /// Filing date as `YYYY-MM-DD`
    pub date: String,
}

/// Files a report and credits `points` to the reporter.
///
/// Within one database transaction this inserts the report as `pending`, adds the
/// points to the reporter's points row, appends an `earned_report` ledger entry
/// and creates a `reward` notification.
#[instrument(skip(db, new_report), fields(location = %new_report.location))]
pub async fn create_report(
    db: &DatabaseConnection,
    user_id: i64,
    new_report: NewReport,
    points: i64,
) -> Result<report::Model> {
    new_report.validate()?;
    if points <= 0 {
        return Err(Error::InvalidAmount { amount: points });
    }

    let txn = db.begin().await?;

    user::require_user(&txn, user_id).await?;

    let model = report::ActiveModel {
        user_id: Set(user_id),
        location: Set(new_report.location.trim().to_string()),
        waste_type: Set(new_report.waste_type.trim().to_string()),
        amount: Set(new_report.amount.trim().to_string()),
        image_url: Set(new_report.image_url),
        verification_result: Set(new_report.verification_result),
        status: Set(ReportStatus::Pending.as_str().to_string()),
        collector_id: Set(None),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let created = model.insert(&txn).await?;

    reward::update_reward_points(&txn, user_id, points).await?;
    transaction::create_transaction(
        &txn,
        user_id,
        TransactionKind::EarnedReport,
        points,
        "Points earned for reporting waste".to_string(),
    )
    .await?;
    notification::create_notification(
        &txn,
        user_id,
        format!("You've earned {points} points for reporting waste!"),
        REWARD_KIND,
    )
    .await?;

    txn.commit().await?;
    info!("Report {} filed by user {}", created.id, user_id);
    Ok(created)
}

/// Retrieves a report by id.
pub async fn get_report_by_id<C>(db: &C, report_id: i64) -> Result<Option<report::Model>>
where
    C: ConnectionTrait,
{
    Report::find_by_id(report_id).one(db).await.map_err(Into::into)
}

/// The newest `limit` reports.
pub async fn get_recent_reports(db: &DatabaseConnection, limit: u64) -> Result<Vec<report::Model>> {
    Report::find()
        .order_by_desc(report::Column::CreatedAt)
        .order_by_desc(report::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The newest `limit` reports as collection tasks.
pub async fn get_waste_collection_tasks(
    db: &DatabaseConnection,
    limit: u64,
) -> Result<Vec<CollectionTask>> {
    let reports = get_recent_reports(db, limit).await?;
    Ok(reports
        .into_iter()
        .map(|report| CollectionTask {
            date: report.created_at.format("%Y-%m-%d").to_string(),
            report,
        })
        .collect())
}

/// Moves a report to `status`, assigning `collector_id` when given.
pub async fn update_task_status(
    db: &DatabaseConnection,
    report_id: i64,
    status: ReportStatus,
    collector_id: Option<i64>,
) -> Result<report::Model> {
    let existing = get_report_by_id(db, report_id)
        .await?
        .ok_or(Error::ReportNotFound { id: report_id })?;

    if let Some(collector) = collector_id {
        user::require_user(db, collector).await?;
    }

    let mut active: report::ActiveModel = existing.into();
    active.status = Set(status.as_str().to_string());
    if collector_id.is_some() {
        active.collector_id = Set(collector_id);
    }

    let updated = active.update(db).await?;
    info!("Report {} moved to {}", report_id, status);
    Ok(updated)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::{Notification, Reward, Transaction};
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_report_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let mut missing_location = sample_report();
        missing_location.location = "  ".to_string();
        let result = create_report(&db, 1, missing_location, 10).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        let mut missing_amount = sample_report();
        missing_amount.amount = String::new();
        let result = create_report(&db, 1, missing_amount, 10).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        let result = create_report(&db, 1, sample_report(), 0).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { amount: 0 }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_report_writes_one_transaction_and_one_notification() -> Result<()> {
        let (db, user) = setup_with_user().await?;

        let report = create_report(&db, user.id, sample_report(), 10).await?;
        assert_eq!(report.user_id, user.id);
        assert_eq!(report.status, "pending");
        assert_eq!(report.location, "Riverside Park");
        assert!(report.collector_id.is_none());

        let transactions = Transaction::find().all(&db).await?;
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].transaction_type, "earned_report");
        assert_eq!(transactions[0].amount, 10);

        let notifications = Notification::find().all(&db).await?;
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, "reward");
        assert_eq!(
            notifications[0].message,
            "You've earned 10 points for reporting waste!"
        );

        let rewards = Reward::find().all(&db).await?;
        assert_eq!(rewards.len(), 1);
        assert_eq!(rewards[0].points, 10);

        assert_eq!(transaction::get_user_balance(&db, user.id).await?, 10);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_report_accumulates_points() -> Result<()> {
        let (db, user) = setup_with_user().await?;

        create_report(&db, user.id, sample_report(), 10).await?;
        create_report(&db, user.id, sample_report(), 10).await?;

        let row = reward::find_user_reward(&db, user.id).await?.unwrap();
        assert_eq!(row.points, 20);
        assert_eq!(transaction::get_user_balance(&db, user.id).await?, 20);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_report_unknown_user_writes_nothing() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_report(&db, 404, sample_report(), 10).await;
        assert!(matches!(result.unwrap_err(), Error::UserNotFound { id: 404 }));

        assert!(Report::find().all(&db).await?.is_empty());
        assert!(Transaction::find().all(&db).await?.is_empty());
        assert!(Notification::find().all(&db).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_report_keeps_verification_result() -> Result<()> {
        let (db, user) = setup_with_user().await?;

        let mut new_report = sample_report();
        new_report.verification_result = Some(serde_json::json!({
            "wasteType": "plastic",
            "quantity": "2kg",
            "confidence": 0.9
        }));
        let created = create_report(&db, user.id, new_report, 10).await?;

        let stored = get_report_by_id(&db, created.id).await?.unwrap();
        assert_eq!(
            stored.verification_result.unwrap()["wasteType"],
            serde_json::json!("plastic")
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_recent_reports_and_tasks() -> Result<()> {
        let (db, user) = setup_with_user().await?;

        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(create_report(&db, user.id, sample_report(), 10).await?.id);
        }

        let recent = get_recent_reports(&db, 2).await?;
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, ids[2]);
        assert_eq!(recent[1].id, ids[1]);

        let tasks = get_waste_collection_tasks(&db, 20).await?;
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].report.id, ids[2]);
        assert_eq!(tasks[0].date, chrono::Utc::now().format("%Y-%m-%d").to_string());

        Ok(())
    }

    #[tokio::test]
    async fn test_update_task_status() -> Result<()> {
        let (db, reporter) = setup_with_user().await?;
        let collector = create_test_user(&db, "collector@example.com").await?;
        let report = create_report(&db, reporter.id, sample_report(), 10).await?;

        let claimed =
            update_task_status(&db, report.id, ReportStatus::InProgress, Some(collector.id))
                .await?;
        assert_eq!(claimed.status, "in_progress");
        assert_eq!(claimed.collector_id, Some(collector.id));

        // Omitting the collector keeps the existing assignment
        let done = update_task_status(&db, report.id, ReportStatus::Completed, None).await?;
        assert_eq!(done.status, "completed");
        assert_eq!(done.collector_id, Some(collector.id));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_task_status_not_found() -> Result<()> {
        let (db, user) = setup_with_user().await?;

        let result = update_task_status(&db, 55, ReportStatus::Completed, Some(user.id)).await;
        assert!(matches!(result.unwrap_err(), Error::ReportNotFound { id: 55 }));

        Ok(())
    }

    #[test]
    fn test_report_status_parse() {
        assert_eq!("in_progress".parse::<ReportStatus>().unwrap(), ReportStatus::InProgress);
        assert_eq!(ReportStatus::Verified.to_string(), "verified");
        assert!("lost".parse::<ReportStatus>().is_err());
    }
}
