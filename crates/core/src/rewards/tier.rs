//! Loyalty tiers derived from lifetime points.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Named loyalty levels, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl Tier {
    /// Wire/display name, e.g. `"SILVER"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bronze => "BRONZE",
            Self::Silver => "SILVER",
            Self::Gold => "GOLD",
            Self::Platinum => "PLATINUM",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = TierScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BRONZE" => Ok(Self::Bronze),
            "SILVER" => Ok(Self::Silver),
            "GOLD" => Ok(Self::Gold),
            "PLATINUM" => Ok(Self::Platinum),
            other => Err(TierScheduleError::UnknownTier(other.to_owned())),
        }
    }
}

/// Errors constructing a [`TierSchedule`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TierScheduleError {
    /// Thresholds must be strictly increasing in both minimum points and
    /// tier rank.
    #[error("tier thresholds must be strictly increasing: {0} then {1}")]
    NotIncreasing(u64, u64),

    /// Tiers must appear in ascending rank order.
    #[error("tier {0} listed after a higher tier")]
    OutOfOrder(Tier),

    /// Unrecognized tier name in configuration.
    #[error("unknown tier name: {0}")]
    UnknownTier(String),
}

/// Ordered tier thresholds over lifetime points earned.
///
/// [`Tier::Bronze`] is the implicit base at zero points; the schedule
/// lists the upgrades above it. `tier_for` is a pure function, so two
/// accounts with equal `total_points_earned` always land on the same
/// tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierSchedule {
    thresholds: Vec<(Tier, u64)>,
}

impl TierSchedule {
    /// Build a schedule from `(tier, minimum lifetime points)` entries.
    ///
    /// # Errors
    ///
    /// Returns `TierScheduleError` unless minimums are strictly
    /// increasing, tiers appear in ascending rank order, and no minimum
    /// is zero (zero is the Bronze base).
    pub fn new(thresholds: Vec<(Tier, u64)>) -> Result<Self, TierScheduleError> {
        let mut previous_min = 0u64;
        let mut previous_tier = Tier::Bronze;
        for &(tier, min) in &thresholds {
            if min <= previous_min {
                return Err(TierScheduleError::NotIncreasing(previous_min, min));
            }
            if tier <= previous_tier {
                return Err(TierScheduleError::OutOfOrder(tier));
            }
            previous_min = min;
            previous_tier = tier;
        }
        Ok(Self { thresholds })
    }

    /// The tier earned by a lifetime total.
    #[must_use]
    pub fn tier_for(&self, total_points_earned: u64) -> Tier {
        self.thresholds
            .iter()
            .take_while(|&&(_, min)| total_points_earned >= min)
            .last()
            .map_or(Tier::Bronze, |&(tier, _)| tier)
    }

    /// The configured `(tier, minimum)` entries, ascending.
    #[must_use]
    pub fn thresholds(&self) -> &[(Tier, u64)] {
        &self.thresholds
    }
}

impl Default for TierSchedule {
    /// Silver at 100, Gold at 500, Platinum at 1500 lifetime points.
    fn default() -> Self {
        Self {
            thresholds: vec![
                (Tier::Silver, 100),
                (Tier::Gold, 500),
                (Tier::Platinum, 1500),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn silver_gold() -> TierSchedule {
        TierSchedule::new(vec![(Tier::Silver, 100), (Tier::Gold, 500)]).unwrap()
    }

    #[test]
    fn zero_points_is_bronze() {
        assert_eq!(silver_gold().tier_for(0), Tier::Bronze);
        assert_eq!(silver_gold().tier_for(99), Tier::Bronze);
    }

    #[test]
    fn one_hundred_fifty_points_is_silver() {
        assert_eq!(silver_gold().tier_for(150), Tier::Silver);
    }

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(silver_gold().tier_for(100), Tier::Silver);
        assert_eq!(silver_gold().tier_for(500), Tier::Gold);
    }

    #[test]
    fn tier_is_monotone_in_lifetime_points() {
        let schedule = TierSchedule::default();
        let mut last = Tier::Bronze;
        for total in [0, 50, 100, 400, 500, 1000, 1500, 10_000] {
            let tier = schedule.tier_for(total);
            assert!(tier >= last, "tier regressed at {total}");
            last = tier;
        }
    }

    #[test]
    fn rejects_non_increasing_minimums() {
        let result = TierSchedule::new(vec![(Tier::Silver, 500), (Tier::Gold, 100)]);
        assert_eq!(result, Err(TierScheduleError::NotIncreasing(500, 100)));
    }

    #[test]
    fn rejects_out_of_rank_order() {
        let result = TierSchedule::new(vec![(Tier::Gold, 100), (Tier::Silver, 500)]);
        assert_eq!(result, Err(TierScheduleError::OutOfOrder(Tier::Silver)));
    }

    #[test]
    fn rejects_zero_minimum() {
        let result = TierSchedule::new(vec![(Tier::Silver, 0)]);
        assert!(result.is_err());
    }

    #[test]
    fn tier_names_parse_case_insensitively() {
        assert_eq!("gold".parse::<Tier>().unwrap(), Tier::Gold);
        assert_eq!("PLATINUM".parse::<Tier>().unwrap(), Tier::Platinum);
        assert!("diamond".parse::<Tier>().is_err());
    }
}
