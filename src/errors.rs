//! Unified error type for the service.
//!
//! Every fallible operation returns [`Result`]. Database, HTTP-client and
//! serialization failures convert in through `#[from]`; domain failures use
//! struct variants so callers can match on the offending value.

use thiserror::Error;

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Input failed validation before touching the database
    #[error("Validation error: {message}")]
    Validation {
        /// What was rejected
        message: String,
    },

    /// A points amount was zero or negative where a positive value is required
    #[error("Invalid points amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: i64,
    },

    /// No user with the given id
    #[error("User not found: {id}")]
    UserNotFound {
        /// Requested user id
        id: i64,
    },

    /// No user registered under the given email
    #[error("No user registered with email {email}")]
    UnknownEmail {
        /// Requested email
        email: String,
    },

    /// No report with the given id
    #[error("Report not found: {id}")]
    ReportNotFound {
        /// Requested report id
        id: i64,
    },

    /// No available reward with the given id
    #[error("Reward not found: {id}")]
    RewardNotFound {
        /// Requested reward id
        id: i64,
    },

    /// No notification with the given id
    #[error("Notification not found: {id}")]
    NotificationNotFound {
        /// Requested notification id
        id: i64,
    },

    /// A redemption costs more than the user holds
    #[error("Insufficient points: have {available}, need {required}")]
    InsufficientPoints {
        /// Points currently held
        available: i64,
        /// Points the redemption costs
        required: i64,
    },

    /// "Redeem all" was requested with an empty balance
    #[error("No points to redeem")]
    NothingToRedeem,

    /// The classifier answered but its output was not a usable analysis
    #[error("Verification failed: {message}")]
    Verification {
        /// Why the analysis was rejected
        message: String,
    },

    /// Every configured model failed
    #[error("All models failed. Details: {details}")]
    ClassifierUnavailable {
        /// Per-model failures joined with `; `
        details: String,
    },

    /// The classifier rejected the call for rate or quota reasons
    #[error("Usage limit exceeded: {details}")]
    QuotaExceeded {
        /// Per-model failures joined with `; `
        details: String,
    },

    /// No API key configured for the classifier
    #[error("Classifier API key not configured")]
    MissingApiKey,

    /// An upstream HTTP service answered with a non-success status
    #[error("Upstream error ({status}): {message}")]
    Upstream {
        /// HTTP status code returned upstream
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// Database error from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Transport-level HTTP client error
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
