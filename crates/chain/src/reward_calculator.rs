//! Decreasing reward schedule.
//!
//! The reward ledger only depends on the [`RewardCalculator`] trait. The
//! bundled [`DecreasingRewardCalculator`] pays a fixed amount per unit of
//! node weight in year 1 and reduces it by a fixed percentage every
//! following year.

use std::fmt;

use pnode_common::config::{DEFAULT_BASE_REWARD_PER_UNIT, DEFAULT_YEARLY_DECAY_PERCENT};
use pnode_common::LedgerConfig;

/// Pure reward function.
///
/// Implementations must be deterministic and non-increasing in `year` for a
/// fixed `weight`. `year` is always within `1..=max_reward_year` when called
/// by the ledger.
pub trait RewardCalculator: fmt::Debug + Send + Sync {
    fn reward_for_year(&self, year: u32, weight: u64) -> u128;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecreasingRewardCalculator {
    /// Year-1 reward per weight unit.
    pub base_per_unit: u128,
    /// Percentage removed from the per-unit reward each year.
    pub yearly_decay_percent: u8,
}

impl Default for DecreasingRewardCalculator {
    fn default() -> Self {
        Self {
            base_per_unit: DEFAULT_BASE_REWARD_PER_UNIT,
            yearly_decay_percent: DEFAULT_YEARLY_DECAY_PERCENT,
        }
    }
}

impl DecreasingRewardCalculator {
    pub fn new(base_per_unit: u128, yearly_decay_percent: u8) -> Self {
        Self {
            base_per_unit,
            yearly_decay_percent: yearly_decay_percent.min(100),
        }
    }

    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::new(config.base_reward_per_unit, config.yearly_decay_percent)
    }

    /// Per-unit reward for `year`. Year 0 is treated as year 1.
    pub fn per_unit(&self, year: u32) -> u128 {
        let keep = 100u128 - u128::from(self.yearly_decay_percent);
        let mut per_unit = self.base_per_unit;
        for _ in 1..year {
            if per_unit == 0 {
                break;
            }
            per_unit = per_unit.saturating_mul(keep) / 100;
        }
        per_unit
    }
}

impl RewardCalculator for DecreasingRewardCalculator {
    fn reward_for_year(&self, year: u32, weight: u64) -> u128 {
        self.per_unit(year).saturating_mul(u128::from(weight))
    }
}
