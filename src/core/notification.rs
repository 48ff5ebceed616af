//! Notification business logic.

use crate::{
    entities::{Notification, notification},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Kind used for points-earned notifications.
pub const REWARD_KIND: &str = "reward";

/// Creates an unread notification for a user.
pub async fn create_notification<C>(
    db: &C,
    user_id: i64,
    message: String,
    kind: &str,
) -> Result<notification::Model>
where
    C: ConnectionTrait,
{
    let model = notification::ActiveModel {
        user_id: Set(user_id),
        message: Set(message),
        kind: Set(kind.to_string()),
        is_read: Set(false),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    model.insert(db).await.map_err(Into::into)
}

/// Unread notifications for a user, newest first.
///
/// Clients poll this on a fixed interval.
pub async fn get_unread_notifications(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<notification::Model>> {
    Notification::find()
        .filter(notification::Column::UserId.eq(user_id))
        .filter(notification::Column::IsRead.eq(false))
        .order_by_desc(notification::Column::CreatedAt)
        .order_by_desc(notification::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Marks a notification as read. Marking an already-read notification is a no-op.
pub async fn mark_notification_as_read(
    db: &DatabaseConnection,
    notification_id: i64,
) -> Result<notification::Model> {
    let existing = Notification::find_by_id(notification_id)
        .one(db)
        .await?
        .ok_or(Error::NotificationNotFound {
            id: notification_id,
        })?;

    if existing.is_read {
        return Ok(existing);
    }

    let mut active: notification::ActiveModel = existing.into();
    active.is_read = Set(true);
    active.update(db).await.map_err(Into::into)
}
