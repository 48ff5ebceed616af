//! Request handlers grouped by resource.

/// Report filing and collection tasks
pub mod reports;
/// Rewards, redemption and leaderboard
pub mod rewards;
/// Users, balances and notifications
pub mod users;
/// Photo verification and location search
pub mod verification;
