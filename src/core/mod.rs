//! Core business logic - framework-agnostic operations over the database.
//!
//! Every function takes a `SeaORM` connection and returns [`crate::errors::Result`].
//! Helpers that must run inside a database transaction are generic over
//! `ConnectionTrait`.

/// Verified pickups of reported waste
pub mod collection;
/// Per-user notifications
pub mod notification;
/// Filing and tracking waste reports
pub mod report;
/// Points rows, catalog, redemption and leaderboard
pub mod reward;
/// The points ledger and balance derivation
pub mod transaction;
/// User registration and lookup
pub mod user;
/// Parsing classifier output
pub mod verification;
