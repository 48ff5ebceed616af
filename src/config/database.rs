//! Database configuration module.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs without hand-written SQL. Creation is idempotent (`IF NOT EXISTS`)
//! so it can run on every startup.

use crate::entities::{CollectedWaste, Notification, Report, Reward, Transaction, User};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::Path;
use tracing::{debug, info};

/// Default connection string when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/waste_rewards.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database at `database_url`.
///
/// For file-backed `SQLite` URLs the parent directory is created first so a
/// fresh checkout can start without manual setup.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(parent) = sqlite_parent_dir(database_url) {
        debug!("Ensuring database directory {:?} exists", parent);
        std::fs::create_dir_all(parent)?;
    }

    let db = Database::connect(database_url).await?;
    info!("Connected to database");
    Ok(db)
}

/// Returns the directory holding a file-backed `SQLite` database, if any.
fn sqlite_parent_dir(database_url: &str) -> Option<&Path> {
    let path = database_url.strip_prefix("sqlite://")?;
    let path = path.split('?').next()?;
    if path.is_empty() || path.contains(":memory:") {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
}

/// Creates all tables from the entity definitions.
///
/// Parents are created before children so foreign keys resolve.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, User).await?;
    create_table(db, &schema, Report).await?;
    create_table(db, &schema, Reward).await?;
    create_table(db, &schema, Transaction).await?;
    create_table(db, &schema, Notification).await?;
    create_table(db, &schema, CollectedWaste).await?;

    Ok(())
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}
