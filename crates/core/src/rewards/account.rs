//! Per-(user, club) rewards account and its transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rewards::tier::{Tier, TierSchedule};
use crate::rewards::{RewardsConfig, RewardsError};
use crate::types::{ClubId, UserId};

/// Mutable loyalty snapshot for one user at one club.
///
/// Created on first earn event, never deleted. All transitions are pure
/// methods on this struct; atomicity against concurrent writers is the
/// store's job (compare-and-swap on a version, retried by the caller).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardsAccount {
    pub user_id: UserId,
    pub club_id: ClubId,
    /// Spendable balance. Never negative: redeem checks before debiting.
    pub current_points: u64,
    /// Lifetime credits; only grows, drives the tier.
    pub total_points_earned: u64,
    /// Streak of qualifying purchases since the last free-drink
    /// redemption.
    pub consecutive_purchases: u32,
    pub tier: Tier,
    pub last_earned_at: Option<DateTime<Utc>>,
}

impl RewardsAccount {
    /// Fresh account at zero points, Bronze tier.
    #[must_use]
    pub const fn new(user_id: UserId, club_id: ClubId) -> Self {
        Self {
            user_id,
            club_id,
            current_points: 0,
            total_points_earned: 0,
            consecutive_purchases: 0,
            tier: Tier::Bronze,
            last_earned_at: None,
        }
    }

    /// Credit a qualifying purchase.
    ///
    /// Extends the purchase streak and recomputes the tier from the new
    /// lifetime total. Returns `true` when this earn reached (or kept)
    /// the free-drink milestone, i.e. a redemption token should be
    /// minted.
    pub fn earn(&mut self, points: u64, now: DateTime<Utc>, config: &RewardsConfig) -> bool {
        self.credit(points, now, &config.tier_schedule);
        self.consecutive_purchases = self.consecutive_purchases.saturating_add(1);
        self.consecutive_purchases >= config.free_drink_milestone
    }

    /// Administrative credit: same as earn, but the purchase streak does
    /// not move.
    pub fn bonus(&mut self, points: u64, now: DateTime<Utc>, config: &RewardsConfig) {
        self.credit(points, now, &config.tier_schedule);
    }

    /// Spend points.
    ///
    /// # Errors
    ///
    /// `RewardsError::InsufficientPoints` when the balance is short; the
    /// account is left untouched.
    pub fn redeem_points(&mut self, cost: u64) -> Result<(), RewardsError> {
        if self.current_points < cost {
            return Err(RewardsError::InsufficientPoints {
                needed: cost,
                available: self.current_points,
            });
        }
        self.current_points -= cost;
        Ok(())
    }

    /// Redeem the free-drink milestone reward.
    ///
    /// Costs no points; resets the purchase streak to zero.
    ///
    /// # Errors
    ///
    /// `RewardsError::MilestoneNotReached` when the streak is short; the
    /// account is left untouched.
    pub fn redeem_milestone(&mut self, milestone: u32) -> Result<(), RewardsError> {
        if self.consecutive_purchases < milestone {
            return Err(RewardsError::MilestoneNotReached {
                needed: milestone,
                current: self.consecutive_purchases,
            });
        }
        self.consecutive_purchases = 0;
        Ok(())
    }

    fn credit(&mut self, points: u64, now: DateTime<Utc>, schedule: &TierSchedule) {
        self.current_points = self.current_points.saturating_add(points);
        self.total_points_earned = self.total_points_earned.saturating_add(points);
        self.last_earned_at = Some(now);
        self.tier = schedule.tier_for(self.total_points_earned);
    }
}
