//! # Reward Cooldown Window
//!
//! A user may receive at most one reward per cooldown window, across all
//! reward years. The window is measured from the user's most recent reward
//! time.
//!
//! ## Determinism
//!
//! All time calculations take the current timestamp as a parameter. There
//! is no clock access; every method is a pure function.
//!
//! ## Safety Properties
//!
//! - Arithmetic uses `saturating_add` / `saturating_sub`.
//! - A `now` earlier than the last reward time is treated as inside the
//!   window (the conservative answer).

use serde::{Deserialize, Serialize};

/// Default cooldown: 24 hours in seconds.
pub const DEFAULT_REWARD_COOLDOWN_SECS: u64 = 86_400;

/// Per-user reward cooldown rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardCooldown {
    /// Window length in seconds.
    pub window_secs: u64,
}

impl Default for RewardCooldown {
    fn default() -> Self {
        Self {
            window_secs: DEFAULT_REWARD_COOLDOWN_SECS,
        }
    }
}

impl RewardCooldown {
    pub const fn new(window_secs: u64) -> Self {
        Self { window_secs }
    }

    /// Timestamp at which a reward issued at `last_reward` stops blocking.
    #[must_use]
    #[inline]
    pub fn expires_at(&self, last_reward: u64) -> u64 {
        last_reward.saturating_add(self.window_secs)
    }

    /// Whether a user last rewarded at `last_reward` is still cooling down.
    ///
    /// `None` means the user was never rewarded.
    #[must_use]
    pub fn is_active(&self, last_reward: Option<u64>, now: u64) -> bool {
        match last_reward {
            None => false,
            Some(last) if now < last => true,
            Some(last) => now - last < self.window_secs,
        }
    }

    /// Seconds until the cooldown ends, `0` if it is not active.
    #[must_use]
    pub fn remaining_secs(&self, last_reward: Option<u64>, now: u64) -> u64 {
        match last_reward {
            None => 0,
            Some(last) => self.expires_at(last).saturating_sub(now),
        }
    }
}
