//! Maps domain errors onto HTTP responses.
//!
//! Every error is logged before the response is built: server-side failures at
//! `error`, client mistakes at `warn`.

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};

impl Error {
    /// HTTP status that best describes this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UserNotFound { .. }
            | Self::UnknownEmail { .. }
            | Self::ReportNotFound { .. }
            | Self::RewardNotFound { .. }
            | Self::NotificationNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Validation { .. } | Self::InvalidAmount { .. } => StatusCode::BAD_REQUEST,
            Self::InsufficientPoints { .. } | Self::NothingToRedeem => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Verification { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::MissingApiKey => StatusCode::SERVICE_UNAVAILABLE,
            Self::ClassifierUnavailable { .. } | Self::Upstream { .. } | Self::Http(_) => {
                StatusCode::BAD_GATEWAY
            }
            Self::Config { .. }
            | Self::Database(_)
            | Self::Json(_)
            | Self::Io(_)
            | Self::EnvVar(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed ({}): {}", status, self);
        } else {
            warn!("Request rejected ({}): {}", status, self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            Error::UserNotFound { id: 1 }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::InsufficientPoints {
                available: 1,
                required: 2
            }
            .status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            Error::QuotaExceeded {
                details: String::new()
            }
            .status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            Error::MissingApiKey.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            Error::Database(sea_orm::DbErr::Custom("boom".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
