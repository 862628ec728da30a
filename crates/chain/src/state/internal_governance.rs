//! # Governance
//!
//! Mutations of the roles and switches that gate every other component.
//!
//! | Operation | Caller |
//! |-----------|--------|
//! | `set_whitelist` | operations signer |
//! | `pause_rewards`, `unpause_rewards` | operations signer or administrator |
//! | `add_op_signer`, `remove_op_signer`, `update_op_threshold` | operations signer |
//! | `add_withdraw_signer`, `remove_withdraw_signer`, `update_withdraw_threshold` | withdrawal signer |
//! | `set_reward_token` | administrator |
//!
//! Signer-set changes apply immediately. Open withdrawal proposals are
//! judged against the threshold in force when they are executed, and
//! confirmations recorded by a removed signer still count.

use pnode_common::{Address, LedgerError, LedgerResult, SignerDomain};
use tracing::info;

use super::{CallContext, LedgerEventKind, LedgerState};

impl LedgerState {
    // ════════════════════════════════════════════════════════════════════════════
    // WHITELIST & PAUSE
    // ════════════════════════════════════════════════════════════════════════════

    pub fn set_whitelist(&mut self, ctx: &CallContext, account: Address, allowed: bool) -> LedgerResult<()> {
        self.require_op_signer(&ctx.caller)?;
        if account.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        if allowed {
            self.whitelist.insert(account, true);
        } else {
            self.whitelist.remove(&account);
        }

        info!(account = %account, allowed, "whitelist updated");
        self.emit(
            ctx.caller,
            ctx.timestamp,
            LedgerEventKind::WhitelistUpdated { account, allowed },
        );
        Ok(())
    }

    /// Stop reward distribution. Idempotent.
    pub fn pause_rewards(&mut self, ctx: &CallContext) -> LedgerResult<()> {
        self.set_paused(ctx, true)
    }

    /// Resume reward distribution. Idempotent.
    pub fn unpause_rewards(&mut self, ctx: &CallContext) -> LedgerResult<()> {
        self.set_paused(ctx, false)
    }

    fn set_paused(&mut self, ctx: &CallContext, paused: bool) -> LedgerResult<()> {
        let role = self.require_op_signer_or_admin(&ctx.caller)?;
        self.paused = paused;
        info!(caller = %ctx.caller, role = ?role, paused, "reward pause flag changed");
        self.emit(ctx.caller, ctx.timestamp, LedgerEventKind::PauseChanged { paused });
        Ok(())
    }

    // ════════════════════════════════════════════════════════════════════════════
    // OPERATIONS SIGNERS
    // ════════════════════════════════════════════════════════════════════════════

    pub fn add_op_signer(&mut self, ctx: &CallContext, signer: Address) -> LedgerResult<()> {
        self.require_op_signer(&ctx.caller)?;
        self.op_signers.add(signer)?;
        self.signer_added(ctx, SignerDomain::Operations, signer);
        Ok(())
    }

    pub fn remove_op_signer(&mut self, ctx: &CallContext, signer: Address) -> LedgerResult<()> {
        self.require_op_signer(&ctx.caller)?;
        self.op_signers.remove(&signer)?;
        self.signer_removed(ctx, SignerDomain::Operations, signer);
        Ok(())
    }

    pub fn update_op_threshold(&mut self, ctx: &CallContext, threshold: u32) -> LedgerResult<()> {
        self.require_op_signer(&ctx.caller)?;
        self.op_signers.set_threshold(threshold)?;
        self.threshold_updated(ctx, SignerDomain::Operations, threshold);
        Ok(())
    }

    // ════════════════════════════════════════════════════════════════════════════
    // WITHDRAWAL SIGNERS
    // ════════════════════════════════════════════════════════════════════════════

    pub fn add_withdraw_signer(&mut self, ctx: &CallContext, signer: Address) -> LedgerResult<()> {
        self.require_withdraw_signer(&ctx.caller)?;
        self.withdraw_signers.add(signer)?;
        self.signer_added(ctx, SignerDomain::Withdrawal, signer);
        Ok(())
    }

    pub fn remove_withdraw_signer(&mut self, ctx: &CallContext, signer: Address) -> LedgerResult<()> {
        self.require_withdraw_signer(&ctx.caller)?;
        self.withdraw_signers.remove(&signer)?;
        self.signer_removed(ctx, SignerDomain::Withdrawal, signer);
        Ok(())
    }

    pub fn update_withdraw_threshold(&mut self, ctx: &CallContext, threshold: u32) -> LedgerResult<()> {
        self.require_withdraw_signer(&ctx.caller)?;
        self.withdraw_signers.set_threshold(threshold)?;
        self.threshold_updated(ctx, SignerDomain::Withdrawal, threshold);
        Ok(())
    }

    fn signer_added(&mut self, ctx: &CallContext, domain: SignerDomain, signer: Address) {
        info!(%domain, signer = %signer, by = %ctx.caller, "signer added");
        self.emit(ctx.caller, ctx.timestamp, LedgerEventKind::SignerAdded { domain, signer });
    }

    fn signer_removed(&mut self, ctx: &CallContext, domain: SignerDomain, signer: Address) {
        info!(%domain, signer = %signer, by = %ctx.caller, "signer removed");
        self.emit(ctx.caller, ctx.timestamp, LedgerEventKind::SignerRemoved { domain, signer });
    }

    fn threshold_updated(&mut self, ctx: &CallContext, domain: SignerDomain, threshold: u32) {
        info!(%domain, threshold, by = %ctx.caller, "signer threshold updated");
        self.emit(
            ctx.caller,
            ctx.timestamp,
            LedgerEventKind::ThresholdUpdated { domain, threshold },
        );
    }

    // ════════════════════════════════════════════════════════════════════════════
    // REWARD TOKEN
    // ════════════════════════════════════════════════════════════════════════════

    /// Point reward payouts and deposits at `token`.
    pub fn set_reward_token(&mut self, ctx: &CallContext, token: Address) -> LedgerResult<()> {
        self.require_admin(&ctx.caller)?;
        if !self.tokens.contains(&token) {
            return Err(LedgerError::UnknownToken(token));
        }
        self.reward_token = Some(token);

        info!(token = %token, "reward token updated");
        self.emit(ctx.caller, ctx.timestamp, LedgerEventKind::RewardTokenUpdated { token });
        Ok(())
    }
}
