//! Reward entity - Points rows and the redeemable catalog share one table.
//!
//! A row with a `user_id` is that user's running points total. A row without an
//! owner is a catalog item whose `points` is its redemption cost.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reward database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rewards")]
pub struct Model {
    /// Unique identifier for the reward
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user, `None` for catalog items. At most one row per user.
    #[sea_orm(unique)]
    pub user_id: Option<i64>,
    /// Points held (user rows) or points required (catalog rows)
    pub points: i64,
    /// Whether the reward can currently be redeemed
    pub is_available: bool,
    /// Short display name
    pub name: String,
    /// Longer description
    pub description: Option<String>,
    /// How the reward is handed out or how the points were earned
    pub collection_info: String,
    /// When the row was created
    pub created_at: DateTimeUtc,
    /// When the points last changed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Reward and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// User rows belong to their owner
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
