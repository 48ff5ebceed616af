//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod collected_waste;
pub mod notification;
pub mod report;
pub mod reward;
pub mod transaction;
pub mod user;

// Re-export specific types to avoid conflicts
pub use collected_waste::{
    Column as CollectedWasteColumn, Entity as CollectedWaste, Model as CollectedWasteModel,
};
pub use notification::{
    Column as NotificationColumn, Entity as Notification, Model as NotificationModel,
};
pub use report::{Column as ReportColumn, Entity as Report, Model as ReportModel};
pub use reward::{Column as RewardColumn, Entity as Reward, Model as RewardModel};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
