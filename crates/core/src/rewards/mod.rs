//! The loyalty ledger state machine.
//!
//! Each `(user, club)` pair owns one [`RewardsAccount`]. Accounts mutate
//! through exactly three transitions - earn, bonus, redeem - and every
//! transition is mirrored by an append-only [`RewardsTransaction`], so the
//! transaction log is an audit trail independent of the mutable snapshot.
//!
//! # Invariants
//!
//! - `current_points` never goes negative (redeem checks its precondition
//!   before debiting).
//! - `total_points_earned` only grows, so the tier derived from it never
//!   regresses even when `current_points` is spent down.
//! - Tier is a pure function of `total_points_earned` against an ordered
//!   [`TierSchedule`]; thresholds are configuration, not code.

pub mod account;
pub mod tier;
pub mod transaction;

use thiserror::Error;

pub use account::RewardsAccount;
pub use tier::{Tier, TierSchedule, TierScheduleError};
pub use transaction::{RewardsTransaction, TransactionKind};

/// Loyalty program configuration.
///
/// Recognized options: the ordered tier thresholds and the
/// consecutive-purchase count that earns a free drink.
#[derive(Debug, Clone)]
pub struct RewardsConfig {
    /// Ordered tier thresholds over lifetime points earned.
    pub tier_schedule: TierSchedule,
    /// Consecutive qualifying purchases required for a free-drink
    /// redemption.
    pub free_drink_milestone: u32,
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            tier_schedule: TierSchedule::default(),
            free_drink_milestone: 10,
        }
    }
}

/// Business-rule failures for ledger transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RewardsError {
    /// A points redemption asked for more than the account holds.
    #[error("insufficient points: need {needed}, have {available}")]
    InsufficientPoints { needed: u64, available: u64 },

    /// A free-drink redemption before the purchase streak reached the
    /// milestone.
    #[error("free-drink milestone not reached: need {needed} consecutive purchases, have {current}")]
    MilestoneNotReached { needed: u32, current: u32 },
}
