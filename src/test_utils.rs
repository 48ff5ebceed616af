//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    config::settings::CatalogEntry,
    core::{report::NewReport, reward, transaction, transaction::TransactionKind, user},
    entities,
    errors::Result,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test user whose name is the local part of `email`.
pub async fn create_test_user(db: &DatabaseConnection, email: &str) -> Result<entities::user::Model> {
    let name = email.split('@').next().unwrap_or(email);
    user::create_user(db, email, name).await
}

/// Records a ledger entry with the description `"Test transaction"`.
pub async fn create_test_transaction(
    db: &DatabaseConnection,
    user_id: i64,
    kind: TransactionKind,
    amount: i64,
) -> Result<entities::transaction::Model> {
    transaction::create_transaction(db, user_id, kind, amount, "Test transaction".to_string()).await
}

/// A report that passes validation.
///
/// # Defaults
/// * `location`: "Riverside Park"
/// * `waste_type`: "plastic"
/// * `amount`: "2 kg"
pub fn sample_report() -> NewReport {
    NewReport {
        location: "Riverside Park".to_string(),
        waste_type: "plastic".to_string(),
        amount: "2 kg".to_string(),
        ..NewReport::default()
    }
}

/// Seeds two catalog rewards: "Reusable Bag" (20 points) and "Bus Pass" (100 points).
pub async fn seed_test_catalog(db: &DatabaseConnection) -> Result<Vec<entities::reward::Model>> {
    let entries = [
        CatalogEntry {
            name: "Reusable Bag".to_string(),
            points: 20,
            description: Some("Canvas tote".to_string()),
            collection_info: "Pick up at the community center".to_string(),
        },
        CatalogEntry {
            name: "Bus Pass".to_string(),
            points: 100,
            description: None,
            collection_info: "Emailed within a week".to_string(),
        },
    ];
    reward::seed_catalog(db, &entries).await?;

    Ok(entities::Reward::find()
        .filter(entities::reward::Column::UserId.is_null())
        .all(db)
        .await?)
}

/// Sets up a complete test environment with one user.
/// Returns (db, user) for common test scenarios.
pub async fn setup_with_user() -> Result<(DatabaseConnection, entities::user::Model)> {
    let db = setup_test_db().await?;
    let user = create_test_user(&db, "tester@example.com").await?;
    Ok((db, user))
}
