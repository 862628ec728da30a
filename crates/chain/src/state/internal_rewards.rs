//! # Reward Ledger
//!
//! Pays yearly, decreasing rewards to node owners.
//!
//! ## Anti-Replay Rules
//!
//! A user is eligible for `(user, year)` only if:
//!
//! 1. `reward_status[(user, year)].rewarded` is false, and
//! 2. the user's most recent reward (any year) is outside the cooldown
//!    window (`LedgerConfig::reward_cooldown_secs`, default 24h).
//!
//! Eligible users without active nodes are still marked rewarded with a
//! zero amount, so an empty account cannot be re-probed every window.
//!
//! ## Amount
//!
//! ```text
//! amount(user, year) = Σ reward_for_year(year, capacity × tier_pct / 100)
//!                      over the user's active nodes
//! ```
//!
//! ## Ordering
//!
//! Preconditions → eligibility → treasury sufficiency → mark rewarded →
//! transfers. Reward marks are committed before any token transfer is
//! issued. If any transfer fails, the marks, cooldown stamps and token
//! balances of the whole batch are restored before the error returns.

use std::collections::HashSet;

use pnode_common::{Address, LedgerError, LedgerResult};
use tracing::{info, warn};

use crate::token::settle_transfer;

use super::{CallContext, LedgerEventKind, LedgerState, RewardBatchReport, RewardPayout, RewardStatus};

impl LedgerState {
    // ════════════════════════════════════════════════════════════════════════════
    // DISTRIBUTION
    // ════════════════════════════════════════════════════════════════════════════

    /// Reward a batch of users for `year`.
    ///
    /// Ineligible users are skipped. The call fails only if no user at all
    /// is eligible: `AlreadyRewardedOrCooldown` for a single-user batch,
    /// `NoEligibleUsers` otherwise. A user listed twice is skipped on the
    /// second occurrence.
    ///
    /// Caller must be the administrator.
    pub fn distribute_rewards(
        &mut self,
        ctx: &CallContext,
        users: &[Address],
        year: u32,
    ) -> LedgerResult<RewardBatchReport> {
        self.require_admin(&ctx.caller)?;
        let token = self.check_reward_preconditions(year)?;

        let mut report = RewardBatchReport {
            year,
            ..Default::default()
        };
        let mut plan: Vec<RewardPayout> = Vec::with_capacity(users.len());
        let mut in_batch: HashSet<Address> = HashSet::with_capacity(users.len());

        for user in users {
            if !in_batch.insert(*user) || !self.is_reward_eligible(user, year, ctx.timestamp) {
                warn!(
                    user = %user,
                    year,
                    cooldown_remaining = self.cooldown_remaining(user, ctx.timestamp),
                    "user skipped: already rewarded or cooling down"
                );
                report.skipped.push(*user);
                continue;
            }
            let amount = self.compute_reward(user, year)?;
            plan.push(RewardPayout { user: *user, amount });
        }

        if plan.is_empty() {
            return Err(match users {
                [single] => LedgerError::AlreadyRewardedOrCooldown { user: *single, year },
                _ => LedgerError::NoEligibleUsers {
                    rejected: report.skipped.len(),
                },
            });
        }

        self.pay_out(token, year, ctx.timestamp, &plan)?;

        for payout in plan {
            if payout.amount > 0 {
                report.paid.push(payout);
            } else {
                report.zero_amount.push(payout.user);
            }
        }

        info!(
            year,
            paid = report.paid.len(),
            zero_amount = report.zero_amount.len(),
            skipped = report.skipped.len(),
            total = %report.total_paid(),
            "reward batch distributed"
        );
        self.emit(
            ctx.caller,
            ctx.timestamp,
            LedgerEventKind::BatchRewardsDistributed {
                year,
                paid: report.paid.clone(),
            },
        );
        Ok(report)
    }

    /// Reward a single user for `year`. Returns the amount paid.
    ///
    /// Same rules as [`distribute_rewards`](Self::distribute_rewards), but an
    /// ineligible user always fails with `AlreadyRewardedOrCooldown`.
    pub fn configure_reward(&mut self, ctx: &CallContext, user: Address, year: u32) -> LedgerResult<u128> {
        self.require_admin(&ctx.caller)?;
        let token = self.check_reward_preconditions(year)?;

        if !self.is_reward_eligible(&user, year, ctx.timestamp) {
            return Err(LedgerError::AlreadyRewardedOrCooldown { user, year });
        }
        let amount = self.compute_reward(&user, year)?;
        self.pay_out(token, year, ctx.timestamp, &[RewardPayout { user, amount }])?;

        info!(user = %user, year, amount = %amount, "reward distributed");
        self.emit(
            ctx.caller,
            ctx.timestamp,
            LedgerEventKind::RewardDistributed { user, year, amount },
        );
        Ok(amount)
    }

    /// Paused flag, year range and reward token, in that order.
    fn check_reward_preconditions(&self, year: u32) -> LedgerResult<Address> {
        if self.paused {
            return Err(LedgerError::Paused);
        }
        self.check_year(year)?;
        self.reward_token.ok_or(LedgerError::TokenNotConfigured)
    }

    fn check_year(&self, year: u32) -> LedgerResult<()> {
        if year == 0 || year > self.config.max_reward_year {
            return Err(LedgerError::InvalidYear(year));
        }
        Ok(())
    }

    /// Check funds, mark every user, then transfer the non-zero amounts.
    /// All-or-nothing.
    fn pay_out(
        &mut self,
        token: Address,
        year: u32,
        now: u64,
        plan: &[RewardPayout],
    ) -> LedgerResult<()> {
        let total = plan.iter().try_fold(0u128, |acc, p| {
            acc.checked_add(p.amount).ok_or(LedgerError::ArithmeticOverflow)
        })?;
        let available = self.tokens.get(&token)?.balance_of(&self.treasury);
        if total > available {
            return Err(LedgerError::InsufficientTreasuryBalance {
                token,
                required: total,
                available,
            });
        }

        let previous: Vec<(Address, Option<RewardStatus>, Option<u64>)> = plan
            .iter()
            .map(|p| {
                (
                    p.user,
                    self.reward_status.get(&(p.user, year)).copied(),
                    self.last_reward_time.get(&p.user).copied(),
                )
            })
            .collect();
        let token_before = self.tokens.get(&token)?.box_clone();

        for p in plan {
            self.reward_status.insert(
                (p.user, year),
                RewardStatus {
                    rewarded: true,
                    last_time: now,
                    amount: p.amount,
                },
            );
            self.last_reward_time.insert(p.user, now);
        }

        let treasury = self.treasury;
        let transferred = {
            let ledger = self.tokens.get_mut(&token)?;
            plan.iter()
                .filter(|p| p.amount > 0)
                .try_for_each(|p| settle_transfer(token, ledger.transfer(&treasury, &p.user, p.amount)))
        };

        if let Err(e) = transferred {
            warn!(year, users = plan.len(), error = %e, "reward transfer failed, batch reverted");
            for (user, status, last) in previous.into_iter().rev() {
                match status {
                    Some(s) => self.reward_status.insert((user, year), s),
                    None => self.reward_status.remove(&(user, year)),
                };
                match last {
                    Some(t) => self.last_reward_time.insert(user, t),
                    None => self.last_reward_time.remove(&user),
                };
            }
            self.tokens.register(token, token_before);
            return Err(e);
        }
        Ok(())
    }

    // ════════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ════════════════════════════════════════════════════════════════════════════

    /// Whether `user` could be rewarded for `year` at `now`.
    pub fn is_reward_eligible(&self, user: &Address, year: u32, now: u64) -> bool {
        if user.is_zero() || self.has_rewarded(user, year) {
            return false;
        }
        let last = self.last_reward_time.get(user).copied();
        !self.config.cooldown().is_active(last, now)
    }

    pub fn has_rewarded(&self, user: &Address, year: u32) -> bool {
        self.reward_status
            .get(&(*user, year))
            .map(|s| s.rewarded)
            .unwrap_or(false)
    }

    pub fn reward_status(&self, user: &Address, year: u32) -> Option<RewardStatus> {
        self.reward_status.get(&(*user, year)).copied()
    }

    /// Most recent reward time of `user` across all years.
    pub fn last_reward_time(&self, user: &Address) -> Option<u64> {
        self.last_reward_time.get(user).copied()
    }

    /// Seconds until `user` leaves the cooldown window.
    pub fn cooldown_remaining(&self, user: &Address, now: u64) -> u64 {
        let last = self.last_reward_time.get(user).copied();
        self.config.cooldown().remaining_secs(last, now)
    }

    /// Amount a reward for `(user, year)` would pay with the current nodes.
    /// Ignores eligibility.
    pub fn pending_reward(&self, user: &Address, year: u32) -> LedgerResult<u128> {
        self.check_year(year)?;
        self.compute_reward(user, year)
    }

    fn compute_reward(&self, user: &Address, year: u32) -> LedgerResult<u128> {
        self.nodes_of(user)
            .filter(|n| n.is_active)
            .try_fold(0u128, |acc, node| {
                let reward = self.calculator.reward_for_year(year, node.reward_weight());
                acc.checked_add(reward).ok_or(LedgerError::ArithmeticOverflow)
            })
    }
}
