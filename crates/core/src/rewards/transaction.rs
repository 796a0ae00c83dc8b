//! Append-only ledger transactions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{ClubId, UserId};

/// How a transaction moved points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Qualifying purchase credit.
    Earn,
    /// Points (or a milestone reward) spent.
    Redeem,
    /// Administrative credit.
    Bonus,
}

/// One ledger entry.
///
/// Exactly one is appended per mutation to a `RewardsAccount`; together
/// they form the audit trail the mutable snapshot is derived from.
/// `points` is a magnitude; `kind` carries the direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardsTransaction {
    pub id: Uuid,
    pub user_id: UserId,
    pub club_id: ClubId,
    pub kind: TransactionKind,
    pub points: u64,
    pub created_at: DateTime<Utc>,
    /// Originating order, when the event came from a purchase.
    pub order_id: Option<String>,
}

impl RewardsTransaction {
    /// Record a transition applied at `created_at`.
    #[must_use]
    pub fn record(
        user_id: UserId,
        club_id: ClubId,
        kind: TransactionKind,
        points: u64,
        created_at: DateTime<Utc>,
        order_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            club_id,
            kind,
            points,
            created_at,
            order_id,
        }
    }
}
