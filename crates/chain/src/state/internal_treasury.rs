//! # Treasury Multisig
//!
//! Withdrawals of treasury funds follow a propose → confirm → execute
//! lifecycle gated by the withdrawal signer set.
//!
//! ```text
//!   propose_withdrawal ──► Proposed(confirmations = 0)
//!                              │
//!             confirm_withdrawal (once per signer)
//!                              │
//!                              ▼
//!              confirmations >= withdraw_threshold
//!                              │
//!             execute_withdrawal ──► Executed (terminal)
//! ```
//!
//! - Proposals are never deleted. An executed proposal rejects further
//!   confirmations and executions with `AlreadyExecuted`.
//! - The threshold is read at execution time, not at proposal time.
//! - `executed` is set before the token transfer is issued and cleared
//!   again if the transfer fails.

use pnode_common::{Address, LedgerError, LedgerResult};
use tracing::{debug, info};

use crate::token::settle_transfer;

use super::{CallContext, LedgerEventKind, LedgerState, WithdrawalProposal};

impl LedgerState {
    // ════════════════════════════════════════════════════════════════════════════
    // PROPOSAL LIFECYCLE
    // ════════════════════════════════════════════════════════════════════════════

    /// Create a withdrawal proposal. Returns its id.
    ///
    /// ## Errors
    ///
    /// - `Unauthorized` unless the caller is a withdrawal signer.
    /// - `ZeroAddress` for a null recipient.
    /// - `InvalidAmount` for a zero amount.
    /// - `UnknownToken` for a token the ledger does not know.
    ///
    /// The treasury balance is not checked until execution.
    pub fn propose_withdrawal(
        &mut self,
        ctx: &CallContext,
        token: Address,
        to: Address,
        amount: u128,
    ) -> LedgerResult<u64> {
        self.require_withdraw_signer(&ctx.caller)?;
        if to.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        self.tokens.get(&token)?;

        let id = self.next_proposal_id;
        let next = id.checked_add(1).ok_or(LedgerError::ArithmeticOverflow)?;
        self.proposals.insert(
            id,
            WithdrawalProposal {
                id,
                token,
                to,
                amount,
                proposer: ctx.caller,
                created_at: ctx.timestamp,
                confirmations: 0,
                confirmed_by: Default::default(),
                executed: false,
                executed_at: None,
            },
        );
        self.next_proposal_id = next;

        info!(proposal_id = id, token = %token, to = %to, amount = %amount, "withdrawal proposed");
        self.emit(
            ctx.caller,
            ctx.timestamp,
            LedgerEventKind::WithdrawalProposed {
                proposal_id: id,
                token,
                to,
                amount,
            },
        );
        Ok(id)
    }

    /// Record the caller's confirmation. Returns the new confirmation count.
    pub fn confirm_withdrawal(&mut self, ctx: &CallContext, proposal_id: u64) -> LedgerResult<u32> {
        self.require_withdraw_signer(&ctx.caller)?;
        let proposal = self
            .proposals
            .get_mut(&proposal_id)
            .ok_or(LedgerError::ProposalNotFound(proposal_id))?;
        if proposal.executed {
            return Err(LedgerError::AlreadyExecuted(proposal_id));
        }
        if proposal.is_confirmed_by(&ctx.caller) {
            return Err(LedgerError::AlreadyConfirmed {
                proposal_id,
                signer: ctx.caller,
            });
        }
        let confirmations = proposal
            .confirmations
            .checked_add(1)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        proposal.confirmed_by.insert(ctx.caller);
        proposal.confirmations = confirmations;

        debug!(proposal_id, signer = %ctx.caller, confirmations, "withdrawal confirmed");
        self.emit(
            ctx.caller,
            ctx.timestamp,
            LedgerEventKind::WithdrawalConfirmed {
                proposal_id,
                confirmations,
            },
        );
        Ok(confirmations)
    }

    /// Execute a proposal that has reached the current threshold.
    ///
    /// The treasury balance is re-checked here; it may have changed since
    /// the proposal was created.
    pub fn execute_withdrawal(&mut self, ctx: &CallContext, proposal_id: u64) -> LedgerResult<()> {
        self.require_withdraw_signer(&ctx.caller)?;
        let proposal = self
            .proposals
            .get(&proposal_id)
            .ok_or(LedgerError::ProposalNotFound(proposal_id))?;
        if proposal.executed {
            return Err(LedgerError::AlreadyExecuted(proposal_id));
        }
        if !self.withdraw_signers.is_met(proposal.confirmations) {
            return Err(LedgerError::NotEnoughConfirmations {
                required: self.withdraw_signers.threshold(),
                actual: proposal.confirmations,
            });
        }
        let (token, to, amount) = (proposal.token, proposal.to, proposal.amount);
        self.check_treasury_covers(token, amount)?;

        if let Some(p) = self.proposals.get_mut(&proposal_id) {
            p.executed = true;
            p.executed_at = Some(ctx.timestamp);
        }

        let treasury = self.treasury;
        let result = self.tokens.get_mut(&token)?.transfer(&treasury, &to, amount);
        if let Err(e) = settle_transfer(token, result) {
            // Proposal stays open for a later attempt.
            if let Some(p) = self.proposals.get_mut(&proposal_id) {
                p.executed = false;
                p.executed_at = None;
            }
            return Err(e);
        }

        info!(proposal_id, token = %token, to = %to, amount = %amount, "withdrawal executed");
        self.emit(
            ctx.caller,
            ctx.timestamp,
            LedgerEventKind::WithdrawalExecuted {
                proposal_id,
                token,
                to,
                amount,
            },
        );
        Ok(())
    }

    /// Confirm unless the caller already has, then execute if the threshold
    /// is met.
    ///
    /// Returns `true` if the proposal was executed by this call.
    pub fn confirm_and_execute_withdrawal(
        &mut self,
        ctx: &CallContext,
        proposal_id: u64,
    ) -> LedgerResult<bool> {
        self.require_withdraw_signer(&ctx.caller)?;
        let proposal = self.get_withdrawal_proposal(proposal_id)?;
        let confirmations = if proposal.is_confirmed_by(&ctx.caller) {
            proposal.confirmations
        } else {
            self.confirm_withdrawal(ctx, proposal_id)?
        };
        if !self.withdraw_signers.is_met(confirmations) {
            return Ok(false);
        }
        self.execute_withdrawal(ctx, proposal_id)?;
        Ok(true)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // DEPOSITS
    // ════════════════════════════════════════════════════════════════════════════

    /// Pull `amount` of the reward token from the administrator into the
    /// treasury. The administrator must have approved the treasury as
    /// spender beforehand.
    pub fn deposit_token(&mut self, ctx: &CallContext, amount: u128) -> LedgerResult<()> {
        self.require_admin(&ctx.caller)?;
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        let token = self.reward_token.ok_or(LedgerError::TokenNotConfigured)?;

        let treasury = self.treasury;
        let result = self
            .tokens
            .get_mut(&token)?
            .transfer_from(&treasury, &ctx.caller, &treasury, amount);
        settle_transfer(token, result)?;

        info!(from = %ctx.caller, token = %token, amount = %amount, "reward token deposited");
        self.emit(
            ctx.caller,
            ctx.timestamp,
            LedgerEventKind::TokenDeposited { token, amount },
        );
        Ok(())
    }

    fn check_treasury_covers(&self, token: Address, amount: u128) -> LedgerResult<()> {
        let available = self.tokens.get(&token)?.balance_of(&self.treasury);
        if available < amount {
            return Err(LedgerError::InsufficientTreasuryBalance {
                token,
                required: amount,
                available,
            });
        }
        Ok(())
    }

    // ════════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ════════════════════════════════════════════════════════════════════════════

    pub fn get_withdrawal_proposal(&self, proposal_id: u64) -> LedgerResult<&WithdrawalProposal> {
        self.proposals
            .get(&proposal_id)
            .ok_or(LedgerError::ProposalNotFound(proposal_id))
    }

    /// Number of proposals ever created. Ids run from 0 to this value - 1.
    pub fn withdrawal_proposal_count(&self) -> u64 {
        self.next_proposal_id
    }

    /// Treasury balance in `token`, `0` for unknown tokens.
    pub fn treasury_balance(&self, token: &Address) -> u128 {
        self.tokens.balance_of(token, &self.treasury)
    }
}
