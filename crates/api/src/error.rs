//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, ApiError>`. Business-rule failures
//! map to specific 4xx responses with a machine-readable reason code;
//! server-side failures are captured to Sentry before a generic response
//! goes out. No error here is fatal to the process - each failure is
//! scoped to its request.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use sipclub_core::rewards::RewardsError;
use sipclub_core::token::TokenInvalid;
use thiserror::Error;

use crate::directory::DirectoryError;
use crate::ledger::LedgerError;
use crate::services::geocoder::GeocodeError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Directory backend failed.
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Ledger operation failed (business rule, token, or store).
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Geocoding failed.
    #[error("Geocode error: {0}")]
    Geocode(#[from] GeocodeError),

    /// Address search requested but no geocoder is configured.
    #[error("Address resolution is not configured")]
    GeocoderDisabled,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body: a stable machine-readable code plus a human message.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ApiError {
    /// Stable reason code for clients.
    #[must_use]
    fn code(&self) -> &'static str {
        match self {
            Self::Directory(_) => "directory_unavailable",
            Self::Ledger(err) => match err {
                LedgerError::Rewards(RewardsError::InsufficientPoints { .. }) => {
                    "insufficient_points"
                }
                LedgerError::Rewards(RewardsError::MilestoneNotReached { .. }) => {
                    "milestone_not_reached"
                }
                LedgerError::Token(TokenInvalid::Malformed) => "token_malformed",
                LedgerError::Token(TokenInvalid::ClubMismatch { .. }) => "token_club_mismatch",
                LedgerError::Token(TokenInvalid::Expired { .. }) => "token_expired",
                LedgerError::AccountNotFound { .. } => "account_not_found",
                LedgerError::Contention | LedgerError::Store(_) => "ledger_unavailable",
            },
            Self::Geocode(GeocodeError::NoResults) => "address_not_resolved",
            Self::Geocode(_) => "geocoder_unavailable",
            Self::GeocoderDisabled => "address_search_disabled",
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::RateLimited => "rate_limited",
            Self::Internal(_) => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Directory(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Ledger(err) => match err {
                LedgerError::Rewards(_) => StatusCode::CONFLICT,
                LedgerError::Token(_) => StatusCode::UNPROCESSABLE_ENTITY,
                LedgerError::AccountNotFound { .. } => StatusCode::NOT_FOUND,
                LedgerError::Contention | LedgerError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            Self::Geocode(GeocodeError::NoResults) => StatusCode::NOT_FOUND,
            Self::Geocode(_) => StatusCode::BAD_GATEWAY,
            Self::GeocoderDisabled => StatusCode::SERVICE_UNAVAILABLE,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Capture server-side failures to Sentry; request-scoped 4xx
        // noise stays out of the error tracker.
        let status = self.status();
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Directory(_) | Self::Internal(_) => "Internal server error".to_owned(),
            Self::Ledger(LedgerError::Contention | LedgerError::Store(_)) => {
                "Ledger temporarily unavailable".to_owned()
            }
            Self::Geocode(GeocodeError::NoResults) => {
                "Address could not be resolved".to_owned()
            }
            Self::Geocode(_) => "Geocoding service error".to_owned(),
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: self.code(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use sipclub_core::types::{ClubId, UserId};

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn business_rule_failures_are_4xx_with_reasons() {
        let insufficient = ApiError::Ledger(LedgerError::Rewards(
            RewardsError::InsufficientPoints {
                needed: 100,
                available: 10,
            },
        ));
        assert_eq!(insufficient.code(), "insufficient_points");
        assert_eq!(status_of(insufficient), StatusCode::CONFLICT);

        let expired = ApiError::Ledger(LedgerError::Token(TokenInvalid::Expired {
            age_hours: 25,
        }));
        assert_eq!(expired.code(), "token_expired");
        assert_eq!(status_of(expired), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn not_found_and_validation_statuses() {
        assert_eq!(
            status_of(ApiError::Ledger(LedgerError::AccountNotFound {
                user_id: UserId::new("u"),
                club_id: ClubId::new("c"),
            })),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ApiError::BadRequest("missing lat".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(ApiError::RateLimited), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn geocode_failures_do_not_leak_details() {
        let response = ApiError::Geocode(GeocodeError::Status("REQUEST_DENIED".into()))
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn disabled_geocoder_is_service_unavailable() {
        assert_eq!(
            status_of(ApiError::GeocoderDisabled),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
