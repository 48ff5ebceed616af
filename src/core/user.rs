//! User business logic - Mirrors auth-provider identities into the database.
//!
//! The auth provider owns sign-in; every time a signed-in user loads the app the
//! caller invokes [`create_user`], which is idempotent per email.

use crate::{
    entities::{User, user},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*, sea_query::OnConflict};
use tracing::info;

/// Display name used when the auth provider has none.
pub const ANONYMOUS_NAME: &str = "Anonymous user";

/// Registers a user, or returns the existing row for this email.
///
/// The email is trimmed and must not be empty. A blank name falls back to
/// [`ANONYMOUS_NAME`]. An existing user's name is left untouched.
pub async fn create_user(db: &DatabaseConnection, email: &str, name: &str) -> Result<user::Model> {
    let email = email.trim();
    if email.is_empty() {
        return Err(Error::Validation {
            message: "Email cannot be empty".to_string(),
        });
    }

    if let Some(existing) = get_user_by_email(db, email).await? {
        return Ok(existing);
    }

    let name = match name.trim() {
        "" => ANONYMOUS_NAME,
        trimmed => trimmed,
    };

    insert_or_get(db, email, name).await
}

/// Inserts the user unless the email is already taken, then returns the stored row.
///
/// A concurrent registration that wins the race is returned as-is.
async fn insert_or_get(db: &DatabaseConnection, email: &str, name: &str) -> Result<user::Model> {
    let user = user::ActiveModel {
        email: Set(email.to_string()),
        name: Set(name.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let inserted = User::insert(user)
        .on_conflict(
            OnConflict::column(user::Column::Email)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    let stored = get_user_by_email(db, email)
        .await?
        .ok_or_else(|| Error::UnknownEmail {
            email: email.to_string(),
        })?;
    if inserted > 0 {
        info!("Registered user {} ({})", stored.id, stored.email);
    }
    Ok(stored)
}

/// Finds a user by email, returning None if not registered.
pub async fn get_user_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Email.eq(email.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a user by id.
pub async fn get_user_by_id<C>(db: &C, user_id: i64) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Like [`get_user_by_id`] but a missing user is an error.
pub async fn require_user<C>(db: &C, user_id: i64) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    get_user_by_id(db, user_id)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })
}
