//! Collected waste entity - A collector's verified pickup of a reported location.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Collected waste database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "collected_waste")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// The report that was collected
    pub report_id: i64,
    /// User who performed the collection
    pub collector_id: i64,
    /// When the collection happened
    pub collection_date: DateTimeUtc,
    /// Collection status, `"verified"` once the classifier confirmed the pickup
    pub status: String,
    /// Classifier output for the collection photo
    pub verification_result: Option<Json>,
}

/// Defines relationships between `CollectedWaste` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each collection refers to one report
    #[sea_orm(
        belongs_to = "super::report::Entity",
        from = "Column::ReportId",
        to = "super::report::Column::Id"
    )]
    Report,
}

impl Related<super::report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Report.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
