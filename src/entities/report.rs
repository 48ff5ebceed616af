//! Report entity - A user-submitted waste-disposal record.
//!
//! Reports start out `pending` and move through collection statuses as a
//! collector picks them up. `amount` is free text as estimated by the
//! classifier (e.g. `"5kg"`), and `verification_result` keeps the raw analysis.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Report database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reports")]
pub struct Model {
    /// Unique identifier for the report
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the reporting user
    pub user_id: i64,
    /// Free-form location, usually a geocoder display name
    pub location: String,
    /// Waste category (e.g. "plastic", "e-waste")
    pub waste_type: String,
    /// Estimated quantity with unit
    pub amount: String,
    /// Reference to the uploaded image (URL or data URL)
    pub image_url: Option<String>,
    /// Classifier output recorded at submission time
    pub verification_result: Option<Json>,
    /// Collection status: `"pending"`, `"in_progress"`, `"completed"` or `"verified"`
    pub status: String,
    /// ID of the user collecting this waste, once assigned
    pub collector_id: Option<i64>,
    /// When the report was filed
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Report and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each report is filed by one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// A report may be collected more than once if re-verified
    #[sea_orm(has_many = "super::collected_waste::Entity")]
    CollectedWaste,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::collected_waste::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CollectedWaste.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
