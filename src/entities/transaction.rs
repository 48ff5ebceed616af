//! Transaction entity - The points ledger.
//!
//! Each row records points earned or spent by a user. `amount` is always positive;
//! the sign comes from `transaction_type` (`earned_*` credits, everything else debits).
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the user whose balance this entry affects
    pub user_id: i64,
    /// Type of transaction: `"earned_report"`, `"earned_collect"` or `"redeemed"`
    pub transaction_type: String,
    /// Points moved by this entry
    pub amount: i64,
    /// Human-readable description of the transaction
    pub description: String,
    /// When the transaction was recorded
    pub date: DateTimeUtc,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one user
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
