//! Reward business logic - Per-user points rows, the catalog, redemption and the leaderboard.
//!
//! The `rewards` table holds two kinds of rows. A row owned by a user tracks that
//! user's running points total and moves in lockstep with the ledger. A row with
//! no owner is a catalog item that can be redeemed for its `points`. Every
//! operation that touches both a points row and the ledger runs inside one
//! database transaction.

use crate::{
    config::settings::CatalogEntry,
    core::{
        transaction::{self, TransactionKind},
        user,
    },
    entities::{Reward, reward},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Serialize;
use tracing::{info, warn};

/// Name given to a user's points row.
pub const USER_REWARD_NAME: &str = "Waste Collection Reward";
/// Collection info given to a user's points row.
pub const USER_REWARD_INFO: &str = "Points earned from waste collection";
/// Id of the synthetic "redeem all points" entry.
pub const ALL_POINTS_REWARD_ID: i64 = 0;
/// Leaderboard name for a row whose owner cannot be loaded.
pub const UNKNOWN_USER_NAME: &str = "Unknown User";

/// One entry in the list of rewards a user can redeem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableReward {
    /// Reward id; [`ALL_POINTS_REWARD_ID`] for the user's own points
    pub id: i64,
    /// Display name
    pub name: String,
    /// Points required
    pub cost: i64,
    /// Longer description
    pub description: Option<String>,
    /// How the reward is handed out
    pub collection_info: String,
}

/// One row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    /// The user's points row
    pub reward_id: i64,
    /// Owner id
    pub user_id: i64,
    /// Owner display name
    pub user_name: String,
    /// Current points
    pub points: i64,
    /// Level derived from points
    pub level: i64,
}

/// Level reached with `points`, one level per `level_step` points starting at 1.
#[must_use]
pub const fn level_for_points(points: i64, level_step: i64) -> i64 {
    if level_step <= 0 || points <= 0 {
        return 1;
    }
    points / level_step + 1
}

/// Finds a user's points row.
pub async fn find_user_reward<C>(db: &C, user_id: i64) -> Result<Option<reward::Model>>
where
    C: ConnectionTrait,
{
    Reward::find()
        .filter(reward::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the user's points row, creating an empty one on first use.
pub async fn get_or_create_reward<C>(db: &C, user_id: i64) -> Result<reward::Model>
where
    C: ConnectionTrait,
{
    if let Some(existing) = find_user_reward(db, user_id).await? {
        return Ok(existing);
    }

    user::require_user(db, user_id).await?;

    let now = chrono::Utc::now();
    let model = reward::ActiveModel {
        user_id: Set(Some(user_id)),
        points: Set(0),
        is_available: Set(true),
        name: Set(USER_REWARD_NAME.to_string()),
        description: Set(None),
        collection_info: Set(USER_REWARD_INFO.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    model.insert(db).await.map_err(Into::into)
}

/// Adds `delta` points to the user's row, creating the row when absent.
///
/// Uses a single `UPDATE rewards SET points = points + delta` so concurrent
/// writers cannot lose updates. A negative delta that would take the row below
/// zero is rejected, as is a delta that would overflow the total.
pub async fn update_reward_points<C>(db: &C, user_id: i64, delta: i64) -> Result<reward::Model>
where
    C: ConnectionTrait,
{
    let current = get_or_create_reward(db, user_id).await?;

    let total = current
        .points
        .checked_add(delta)
        .ok_or(Error::InvalidAmount { amount: delta })?;
    if total < 0 {
        return Err(Error::InsufficientPoints {
            available: current.points,
            required: delta.saturating_neg(),
        });
    }

    Reward::update_many()
        .col_expr(
            reward::Column::Points,
            Expr::col(reward::Column::Points).add(delta),
        )
        .col_expr(reward::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(reward::Column::Id.eq(current.id))
        .exec(db)
        .await?;

    Reward::find_by_id(current.id)
        .one(db)
        .await?
        .ok_or(Error::RewardNotFound { id: current.id })
}

/// Credits points for a collection and records the matching ledger entry.
pub async fn save_reward(db: &DatabaseConnection, user_id: i64, amount: i64) -> Result<reward::Model> {
    if amount <= 0 {
        return Err(Error::InvalidAmount { amount });
    }

    let txn = db.begin().await?;

    let updated = update_reward_points(&txn, user_id, amount).await?;
    transaction::create_transaction(
        &txn,
        user_id,
        TransactionKind::EarnedCollect,
        amount,
        "Points earned for collecting waste".to_string(),
    )
    .await?;

    txn.commit().await?;
    info!("Credited {} collection points to user {}", amount, user_id);
    Ok(updated)
}

/// Lists what a user can redeem.
///
/// The first entry is always the user's own balance under id
/// [`ALL_POINTS_REWARD_ID`]; the rest are available catalog rewards, cheapest first.
pub async fn get_available_rewards(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<AvailableReward>> {
    let balance = transaction::get_user_balance(db, user_id).await?;

    let catalog = Reward::find()
        .filter(reward::Column::UserId.is_null())
        .filter(reward::Column::IsAvailable.eq(true))
        .order_by_asc(reward::Column::Points)
        .order_by_asc(reward::Column::Id)
        .all(db)
        .await?;

    let own_points = AvailableReward {
        id: ALL_POINTS_REWARD_ID,
        name: "Your Points".to_string(),
        cost: balance,
        description: Some("Redeem your earned points".to_string()),
        collection_info: "Points earned from reporting and collecting waste".to_string(),
    };

    Ok(std::iter::once(own_points)
        .chain(catalog.into_iter().map(|item| AvailableReward {
            id: item.id,
            name: item.name,
            cost: item.points,
            description: item.description,
            collection_info: item.collection_info,
        }))
        .collect())
}

/// Redeems a catalog reward, or all points when `reward_id` is [`ALL_POINTS_REWARD_ID`].
///
/// The user's ledger balance must cover the cost. The points row is decremented
/// and a `redeemed` entry written in the same database transaction; the updated
/// points row is returned.
pub async fn redeem_reward(
    db: &DatabaseConnection,
    user_id: i64,
    reward_id: i64,
) -> Result<reward::Model> {
    let txn = db.begin().await?;

    user::require_user(&txn, user_id).await?;
    let balance = transaction::get_user_balance(&txn, user_id).await?;

    let (cost, description) = if reward_id == ALL_POINTS_REWARD_ID {
        if balance <= 0 {
            return Err(Error::NothingToRedeem);
        }
        (balance, format!("Redeemed all points: {balance}"))
    } else {
        let item = Reward::find_by_id(reward_id)
            .filter(reward::Column::UserId.is_null())
            .filter(reward::Column::IsAvailable.eq(true))
            .one(&txn)
            .await?
            .ok_or(Error::RewardNotFound { id: reward_id })?;

        if item.points > balance {
            return Err(Error::InsufficientPoints {
                available: balance,
                required: item.points,
            });
        }
        (item.points, format!("Redeemed: {}", item.name))
    };

    let updated = update_reward_points(&txn, user_id, -cost).await?;
    transaction::create_transaction(&txn, user_id, TransactionKind::Redeemed, cost, description)
        .await?;

    txn.commit().await?;
    info!("User {} redeemed reward {} for {} points", user_id, reward_id, cost);
    Ok(updated)
}

/// Leaderboard of every user's points row, highest first.
pub async fn get_all_rewards(
    db: &DatabaseConnection,
    level_step: i64,
) -> Result<Vec<LeaderboardEntry>> {
    let rows = Reward::find()
        .filter(reward::Column::UserId.is_not_null())
        .order_by_desc(reward::Column::Points)
        .order_by_asc(reward::Column::Id)
        .find_also_related(crate::entities::User)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(row, owner)| {
            let user_id = row.user_id?;
            Some(LeaderboardEntry {
                reward_id: row.id,
                user_id,
                user_name: owner.map_or_else(|| UNKNOWN_USER_NAME.to_string(), |u| u.name),
                points: row.points,
                level: level_for_points(row.points, level_step),
            })
        })
        .collect())
}

/// Inserts configured catalog rewards that are not already present by name.
///
/// Returns how many were inserted. Entries with a non-positive cost are skipped.
pub async fn seed_catalog(db: &DatabaseConnection, entries: &[CatalogEntry]) -> Result<usize> {
    let mut inserted = 0;

    for entry in entries {
        if entry.points <= 0 {
            warn!(
                "Skipping catalog reward '{}' with non-positive cost {}",
                entry.name, entry.points
            );
            continue;
        }

        let exists = Reward::find()
            .filter(reward::Column::UserId.is_null())
            .filter(reward::Column::Name.eq(entry.name.as_str()))
            .one(db)
            .await?
            .is_some();
        if exists {
            continue;
        }

        let now = chrono::Utc::now();
        reward::ActiveModel {
            user_id: Set(None),
            points: Set(entry.points),
            is_available: Set(true),
            name: Set(entry.name.clone()),
            description: Set(entry.description.clone()),
            collection_info: Set(entry.collection_info.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
        inserted += 1;
    }

    if inserted > 0 {
        info!("Seeded {} catalog rewards", inserted);
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn test_level_for_points() {
        assert_eq!(level_for_points(0, 20), 1);
        assert_eq!(level_for_points(19, 20), 1);
        assert_eq!(level_for_points(20, 20), 2);
        assert_eq!(level_for_points(65, 20), 4);
        assert_eq!(level_for_points(-5, 20), 1);
        assert_eq!(level_for_points(100, 0), 1);
    }

    #[tokio::test]
    async fn test_save_reward_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = save_reward(&db, 1, 0).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { amount: 0 }));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_or_create_reward_creates_once() -> Result<()> {
        let (db, user) = setup_with_user().await?;

        let first = get_or_create_reward(&db, user.id).await?;
        assert_eq!(first.user_id, Some(user.id));
        assert_eq!(first.points, 0);
        assert_eq!(first.name, USER_REWARD_NAME);

        let second = get_or_create_reward(&db, user.id).await?;
        assert_eq!(first.id, second.id);
        assert_eq!(Reward::find().all(&db).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_second_points_row_for_user_is_rejected() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        get_or_create_reward(&db, user.id).await?;

        let now = chrono::Utc::now();
        let duplicate = reward::ActiveModel {
            user_id: Set(Some(user.id)),
            points: Set(0),
            is_available: Set(true),
            name: Set(USER_REWARD_NAME.to_string()),
            description: Set(None),
            collection_info: Set(USER_REWARD_INFO.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        assert!(duplicate.insert(&db).await.is_err());

        // Catalog rows share the NULL owner freely
        assert_eq!(seed_test_catalog(&db).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_or_create_reward_unknown_user() -> Result<()> {
        let db = setup_test_db().await?;

        let result = get_or_create_reward(&db, 77).await;
        assert!(matches!(result.unwrap_err(), Error::UserNotFound { id: 77 }));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_reward_points() -> Result<()> {
        let (db, user) = setup_with_user().await?;

        let updated = update_reward_points(&db, user.id, 15).await?;
        assert_eq!(updated.points, 15);

        let updated = update_reward_points(&db, user.id, -5).await?;
        assert_eq!(updated.points, 10);

        let result = update_reward_points(&db, user.id, -11).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientPoints {
                available: 10,
                required: 11
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_reward_points_rejects_overflow() -> Result<()> {
        let (db, user) = setup_with_user().await?;

        let full = save_reward(&db, user.id, i64::MAX).await?;
        assert_eq!(full.points, i64::MAX);

        let result = save_reward(&db, user.id, 1).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { amount: 1 }));

        // Row and ledger untouched by the rejected credit
        let row = find_user_reward(&db, user.id).await?.unwrap();
        assert_eq!(row.points, i64::MAX);
        let ledger = transaction::get_transactions_for_user(&db, user.id).await?;
        assert_eq!(ledger.len(), 1);

        let result = update_reward_points(&db, user.id, i64::MIN).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientPoints {
                available: i64::MAX,
                required: i64::MAX
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_save_reward_writes_points_and_ledger() -> Result<()> {
        let (db, user) = setup_with_user().await?;

        let updated = save_reward(&db, user.id, 30).await?;
        assert_eq!(updated.points, 30);

        let ledger = transaction::get_transactions_for_user(&db, user.id).await?;
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].transaction_type, "earned_collect");
        assert_eq!(ledger[0].amount, 30);
        assert_eq!(transaction::get_user_balance(&db, user.id).await?, 30);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_available_rewards() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        seed_test_catalog(&db).await?;
        save_reward(&db, user.id, 25).await?;

        let available = get_available_rewards(&db, user.id).await?;
        assert_eq!(available.len(), 3);
        assert_eq!(available[0].id, ALL_POINTS_REWARD_ID);
        assert_eq!(available[0].name, "Your Points");
        assert_eq!(available[0].cost, 25);
        // Catalog sorted by cost, user points rows excluded
        assert_eq!(available[1].name, "Reusable Bag");
        assert_eq!(available[1].cost, 20);
        assert_eq!(available[2].name, "Bus Pass");

        Ok(())
    }

    #[tokio::test]
    async fn test_redeem_catalog_reward() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let catalog = seed_test_catalog(&db).await?;
        save_reward(&db, user.id, 25).await?;

        let bag = catalog.iter().find(|c| c.name == "Reusable Bag").unwrap();
        let updated = redeem_reward(&db, user.id, bag.id).await?;
        assert_eq!(updated.points, 5);
        assert_eq!(transaction::get_user_balance(&db, user.id).await?, 5);

        let ledger = transaction::get_transactions_for_user(&db, user.id).await?;
        assert_eq!(ledger[0].transaction_type, "redeemed");
        assert_eq!(ledger[0].amount, 20);
        assert_eq!(ledger[0].description, "Redeemed: Reusable Bag");

        Ok(())
    }

    #[tokio::test]
    async fn test_redeem_rejects_insufficient_points() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let catalog = seed_test_catalog(&db).await?;
        save_reward(&db, user.id, 25).await?;

        let pass = catalog.iter().find(|c| c.name == "Bus Pass").unwrap();
        let result = redeem_reward(&db, user.id, pass.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientPoints {
                available: 25,
                required: 100
            }
        ));

        // Nothing changed
        assert_eq!(transaction::get_user_balance(&db, user.id).await?, 25);
        assert_eq!(find_user_reward(&db, user.id).await?.unwrap().points, 25);

        Ok(())
    }

    #[tokio::test]
    async fn test_redeem_all_points() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        save_reward(&db, user.id, 40).await?;

        let updated = redeem_reward(&db, user.id, ALL_POINTS_REWARD_ID).await?;
        assert_eq!(updated.points, 0);
        assert_eq!(transaction::get_user_balance(&db, user.id).await?, 0);

        let ledger = transaction::get_transactions_for_user(&db, user.id).await?;
        assert_eq!(ledger[0].description, "Redeemed all points: 40");

        // A second attempt has nothing left
        let result = redeem_reward(&db, user.id, ALL_POINTS_REWARD_ID).await;
        assert!(matches!(result.unwrap_err(), Error::NothingToRedeem));

        Ok(())
    }

    #[tokio::test]
    async fn test_redeem_unknown_or_user_owned_reward() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, "alice@example.com").await?;
        let bob = create_test_user(&db, "bob@example.com").await?;
        save_reward(&db, alice.id, 50).await?;
        let bobs_row = save_reward(&db, bob.id, 10).await?;

        let result = redeem_reward(&db, alice.id, 999).await;
        assert!(matches!(result.unwrap_err(), Error::RewardNotFound { id: 999 }));

        // Another user's points row is not a catalog item
        let result = redeem_reward(&db, alice.id, bobs_row.id).await;
        assert!(matches!(result.unwrap_err(), Error::RewardNotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_all_rewards_leaderboard() -> Result<()> {
        let db = setup_test_db().await?;
        seed_test_catalog(&db).await?;
        let alice = create_test_user(&db, "alice@example.com").await?;
        let bob = create_test_user(&db, "bob@example.com").await?;
        save_reward(&db, alice.id, 15).await?;
        save_reward(&db, bob.id, 45).await?;

        let board = get_all_rewards(&db, 20).await?;
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].user_id, bob.id);
        assert_eq!(board[0].user_name, bob.name);
        assert_eq!(board[0].points, 45);
        assert_eq!(board[0].level, 3);
        assert_eq!(board[1].user_id, alice.id);
        assert_eq!(board[1].level, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_catalog_skips_existing_and_invalid() -> Result<()> {
        let db = setup_test_db().await?;

        let entries = vec![
            CatalogEntry {
                name: "Tree Planting".to_string(),
                points: 50,
                description: None,
                collection_info: "Planted on your behalf".to_string(),
            },
            CatalogEntry {
                name: "Free Thing".to_string(),
                points: 0,
                description: None,
                collection_info: String::new(),
            },
        ];

        assert_eq!(seed_catalog(&db, &entries).await?, 1);
        assert_eq!(seed_catalog(&db, &entries).await?, 0);
        assert_eq!(Reward::find().all(&db).await?.len(), 1);

        Ok(())
    }
}
