//! User entity - A registered reporter or collector.
//!
//! Identity is owned by the external auth provider; this table only mirrors the
//! email and display name so reports, rewards and notifications can reference a user.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Email address as reported by the auth provider, unique per user
    #[sea_orm(unique)]
    pub email: String,
    /// Display name
    pub name: String,
    /// When the user was first seen
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user files many reports
    #[sea_orm(has_many = "super::report::Entity")]
    Reports,
    /// One user owns at most one points row, modelled as has-many
    #[sea_orm(has_many = "super::reward::Entity")]
    Rewards,
    /// One user has many ledger entries
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
    /// One user receives many notifications
    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,
}

impl Related<super::report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reports.def()
    }
}

impl Related<super::reward::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rewards.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
