//! Stateless redemption tokens.
//!
//! A token proves a free-drink redemption was authorized for a specific
//! customer at a specific club at a point in time. It is a self-describing
//! UTF-8 JSON payload - no server-side lookup table - so any club terminal
//! can validate one without a round trip. The payload feeds a QR code but
//! is transport-agnostic.
//!
//! # Wire format
//!
//! ```json
//! {"localCustomerId": "u-1001", "clubId": "club-sea-01",
//!  "timestamp": "2026-08-26T18:04:05Z"}
//! ```
//!
//! # Trust model
//!
//! The payload carries no signature or server-issued secret: anyone who
//! knows the shape can forge one. That is acceptable only while tokens are
//! delivered over a trusted channel (the club's own POS surface). Adding a
//! signature is a deliberate behavior change, not a drop-in fix.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ClubId, UserId};

/// Default validity window for a freshly issued token.
pub const DEFAULT_MAX_AGE_HOURS: i64 = 24;

/// The decoded token payload.
///
/// `local_customer_id` is the customer's identifier within the issuing
/// club's loyalty program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RedemptionToken {
    pub local_customer_id: UserId,
    pub club_id: ClubId,
    /// Issue time, ISO-8601.
    pub timestamp: DateTime<Utc>,
}

/// Why a presented token was refused, in validation order.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenInvalid {
    /// The payload did not parse into the three required fields.
    #[error("malformed redemption token")]
    Malformed,

    /// The token was issued for a different club than the one presenting
    /// it.
    #[error("token was issued for club {issued_for}, presented at {presented_at}")]
    ClubMismatch {
        issued_for: ClubId,
        presented_at: ClubId,
    },

    /// More than the maximum age has elapsed since issue.
    #[error("token expired {age_hours}h after issue")]
    Expired { age_hours: i64 },
}

/// Issues and validates redemption tokens.
///
/// Holds only the configured maximum age; issue and validate are pure
/// functions of their arguments and the supplied clock reading.
#[derive(Debug, Clone)]
pub struct RedemptionTokenService {
    max_age: Duration,
}

impl RedemptionTokenService {
    /// Service with a custom validity window.
    #[must_use]
    pub const fn new(max_age: Duration) -> Self {
        Self { max_age }
    }

    /// Encode a token for `local_customer_id` at `club_id`, issued at
    /// `issued_at`.
    ///
    /// # Panics
    ///
    /// Never panics in practice: serializing a struct of two strings and
    /// a timestamp to JSON is infallible.
    #[must_use]
    pub fn issue(
        &self,
        local_customer_id: &UserId,
        club_id: &ClubId,
        issued_at: DateTime<Utc>,
    ) -> String {
        let token = RedemptionToken {
            local_customer_id: local_customer_id.clone(),
            club_id: club_id.clone(),
            timestamp: issued_at,
        };
        serde_json::to_string(&token).expect("redemption token serialization is infallible")
    }

    /// Validate a presented token string.
    ///
    /// Checks run in order: parse, club match, expiry. The first failure
    /// wins, so a malformed token never reports `ClubMismatch` and a
    /// mismatched club never reports `Expired`.
    ///
    /// # Errors
    ///
    /// Returns the applicable [`TokenInvalid`] reason.
    pub fn validate(
        &self,
        token: &str,
        presenting_club: &ClubId,
        now: DateTime<Utc>,
    ) -> Result<RedemptionToken, TokenInvalid> {
        let payload: RedemptionToken =
            serde_json::from_str(token).map_err(|_| TokenInvalid::Malformed)?;

        if payload.club_id != *presenting_club {
            return Err(TokenInvalid::ClubMismatch {
                issued_for: payload.club_id,
                presented_at: presenting_club.clone(),
            });
        }

        let age = now.signed_duration_since(payload.timestamp);
        if age > self.max_age {
            return Err(TokenInvalid::Expired {
                age_hours: age.num_hours(),
            });
        }

        Ok(payload)
    }
}

impl Default for RedemptionTokenService {
    fn default() -> Self {
        Self {
            max_age: Duration::hours(DEFAULT_MAX_AGE_HOURS),
        }
    }
}
