//! # Physical Node Ledger
//!
//! State machine for a physical node network: a registry of operator
//! nodes, a yearly reward ledger paying decreasing rewards out of a
//! treasury, and an M-of-N multisig controlling treasury withdrawals.
//!
//! ## Module Overview
//!
//! | Module | Function |
//! |--------|----------|
//! | `state` | `LedgerState`: registry, rewards, treasury, governance, views, events |
//! | `token` | `TokenLedger` collaborator trait, `InMemoryToken`, `TokenBook` |
//! | `reward_calculator` | `RewardCalculator` trait and `DecreasingRewardCalculator` |
//!
//! Shared types (`Address`, `LedgerError`, `NodeType`, `SignerSet`,
//! `LedgerConfig`) live in `pnode_common` and are re-exported here.
//!
//! ## Concurrency
//!
//! [`Ledger`] wraps the state in `Arc<RwLock<_>>`. Every mutating call is
//! a transaction:
//!
//! ```text
//! write lock ──► clone state ──► run op on the clone ──┬─ Ok  ──► commit clone
//!                                                     └─ Err ──► drop clone
//! ```
//!
//! Token balances live inside the state's `TokenBook`, so a failed
//! operation rolls back token movements together with ledger records.
//! Operations are serialized by the write lock; reads run concurrently.
//!
//! ## Caller-Supplied Context
//!
//! Every mutating operation takes a [`CallContext`] carrying the caller,
//! the current timestamp and the block height. The ledger never reads a
//! clock.

pub mod reward_calculator;
pub mod state;
pub mod token;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use parking_lot::RwLock;
use tracing::{debug, info};

pub use pnode_common::{
    Address, LedgerConfig, LedgerError, LedgerResult, NodeType, SignerDomain,
};
pub use reward_calculator::{DecreasingRewardCalculator, RewardCalculator};
pub use state::{
    CallContext, DeployedNode, LedgerEvent, LedgerEventKind, LedgerInit, LedgerState, NodeInfo,
    NodeRecord, NodeSpec, RegistryCounters, RewardBatchReport, RewardPayout, RewardStatus, Role,
    WithdrawalProposal,
};
pub use token::{settle_transfer, InMemoryToken, TokenBook, TokenError, TokenLedger};

// ════════════════════════════════════════════════════════════════════════════
// LEDGER HANDLE
// ════════════════════════════════════════════════════════════════════════════

/// Shared, thread-safe handle to a [`LedgerState`].
#[derive(Clone, Debug)]
pub struct Ledger {
    state: Arc<RwLock<LedgerState>>,
}

impl Ledger {
    pub fn new(state: LedgerState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Initialize a fresh ledger. See [`LedgerState::initialize`].
    pub fn initialize(
        config: LedgerConfig,
        init: LedgerInit,
        calculator: Arc<dyn RewardCalculator>,
        tokens: TokenBook,
    ) -> LedgerResult<Self> {
        LedgerState::initialize(config, init, calculator, tokens).map(Self::new)
    }

    /// Load a TOML config and initialize a ledger with the bundled
    /// decreasing reward calculator.
    pub fn from_config_file<P: AsRef<Path>>(
        path: P,
        init: LedgerInit,
        tokens: TokenBook,
    ) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let config = pnode_common::config::load_from_file(path)
            .with_context(|| format!("loading ledger config from {}", path.display()))?;
        let calculator = Arc::new(DecreasingRewardCalculator::from_config(&config));
        info!(config = %path.display(), "ledger config loaded");
        Self::initialize(config, init, calculator, tokens).context("initializing ledger state")
    }

    // ════════════════════════════════════════════════════════════════════════
    // TRANSACTIONS
    // ════════════════════════════════════════════════════════════════════════

    /// Run `op` against a working copy and commit it only if `op` succeeds.
    pub fn transact<T, F>(&self, op: F) -> LedgerResult<T>
    where
        F: FnOnce(&mut LedgerState) -> LedgerResult<T>,
    {
        let mut guard = self.state.write();
        let mut working = guard.clone();
        match op(&mut working) {
            Ok(out) => {
                *guard = working;
                Ok(out)
            }
            Err(e) => {
                debug!(error = %e, "operation failed; state unchanged");
                Err(e)
            }
        }
    }

    /// Run a read-only closure under the read lock.
    pub fn read<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&LedgerState) -> T,
    {
        f(&self.state.read())
    }

    /// Owned copy of the current state.
    pub fn snapshot(&self) -> LedgerState {
        self.state.read().clone()
    }

    // ════════════════════════════════════════════════════════════════════════
    // REGISTRY
    // ════════════════════════════════════════════════════════════════════════

    pub fn register_nodes(&self, ctx: &CallContext, batch: &[NodeSpec]) -> LedgerResult<Vec<u64>> {
        self.transact(|s| s.register_nodes(ctx, batch))
    }

    pub fn get_nodes_in_range(&self, owner: &Address, id_from: u64, id_to: u64) -> Vec<NodeRecord> {
        self.read(|s| s.get_nodes_in_range(owner, id_from, id_to))
    }

    pub fn get_node(&self, id: u64) -> Option<NodeRecord> {
        self.read(|s| s.get_node(id).cloned())
    }

    pub fn create_node(&self, ctx: &CallContext, info: NodeInfo) -> LedgerResult<u64> {
        self.transact(|s| s.create_node(ctx, info))
    }

    pub fn deploy_node(&self, index: u64) -> LedgerResult<DeployedNode> {
        self.read(|s| s.deploy_node(index).cloned())
    }

    // ════════════════════════════════════════════════════════════════════════
    // REWARDS
    // ════════════════════════════════════════════════════════════════════════

    pub fn distribute_rewards(
        &self,
        ctx: &CallContext,
        users: &[Address],
        year: u32,
    ) -> LedgerResult<RewardBatchReport> {
        self.transact(|s| s.distribute_rewards(ctx, users, year))
    }

    pub fn configure_reward(&self, ctx: &CallContext, user: Address, year: u32) -> LedgerResult<u128> {
        self.transact(|s| s.configure_reward(ctx, user, year))
    }

    pub fn has_rewarded(&self, user: &Address, year: u32) -> bool {
        self.read(|s| s.has_rewarded(user, year))
    }

    pub fn pending_reward(&self, user: &Address, year: u32) -> LedgerResult<u128> {
        self.read(|s| s.pending_reward(user, year))
    }

    // ════════════════════════════════════════════════════════════════════════
    // TREASURY
    // ════════════════════════════════════════════════════════════════════════

    pub fn propose_withdrawal(
        &self,
        ctx: &CallContext,
        token: Address,
        to: Address,
        amount: u128,
    ) -> LedgerResult<u64> {
        self.transact(|s| s.propose_withdrawal(ctx, token, to, amount))
    }

    pub fn confirm_withdrawal(&self, ctx: &CallContext, proposal_id: u64) -> LedgerResult<u32> {
        self.transact(|s| s.confirm_withdrawal(ctx, proposal_id))
    }

    pub fn execute_withdrawal(&self, ctx: &CallContext, proposal_id: u64) -> LedgerResult<()> {
        self.transact(|s| s.execute_withdrawal(ctx, proposal_id))
    }

    pub fn confirm_and_execute_withdrawal(&self, ctx: &CallContext, proposal_id: u64) -> LedgerResult<bool> {
        self.transact(|s| s.confirm_and_execute_withdrawal(ctx, proposal_id))
    }

    pub fn deposit_token(&self, ctx: &CallContext, amount: u128) -> LedgerResult<()> {
        self.transact(|s| s.deposit_token(ctx, amount))
    }

    pub fn get_withdrawal_proposal(&self, proposal_id: u64) -> LedgerResult<WithdrawalProposal> {
        self.read(|s| s.get_withdrawal_proposal(proposal_id).cloned())
    }

    pub fn treasury_balance(&self, token: &Address) -> u128 {
        self.read(|s| s.treasury_balance(token))
    }

    // ════════════════════════════════════════════════════════════════════════
    // GOVERNANCE
    // ════════════════════════════════════════════════════════════════════════

    pub fn set_whitelist(&self, ctx: &CallContext, account: Address, allowed: bool) -> LedgerResult<()> {
        self.transact(|s| s.set_whitelist(ctx, account, allowed))
    }

    pub fn pause_rewards(&self, ctx: &CallContext) -> LedgerResult<()> {
        self.transact(|s| s.pause_rewards(ctx))
    }

    pub fn unpause_rewards(&self, ctx: &CallContext) -> LedgerResult<()> {
        self.transact(|s| s.unpause_rewards(ctx))
    }

    pub fn set_reward_token(&self, ctx: &CallContext, token: Address) -> LedgerResult<()> {
        self.transact(|s| s.set_reward_token(ctx, token))
    }

    pub fn add_op_signer(&self, ctx: &CallContext, signer: Address) -> LedgerResult<()> {
        self.transact(|s| s.add_op_signer(ctx, signer))
    }

    pub fn remove_op_signer(&self, ctx: &CallContext, signer: Address) -> LedgerResult<()> {
        self.transact(|s| s.remove_op_signer(ctx, signer))
    }

    pub fn update_op_threshold(&self, ctx: &CallContext, threshold: u32) -> LedgerResult<()> {
        self.transact(|s| s.update_op_threshold(ctx, threshold))
    }

    pub fn add_withdraw_signer(&self, ctx: &CallContext, signer: Address) -> LedgerResult<()> {
        self.transact(|s| s.add_withdraw_signer(ctx, signer))
    }

    pub fn remove_withdraw_signer(&self, ctx: &CallContext, signer: Address) -> LedgerResult<()> {
        self.transact(|s| s.remove_withdraw_signer(ctx, signer))
    }

    pub fn update_withdraw_threshold(&self, ctx: &CallContext, threshold: u32) -> LedgerResult<()> {
        self.transact(|s| s.update_withdraw_threshold(ctx, threshold))
    }

    // ════════════════════════════════════════════════════════════════════════
    // VIEWS
    // ════════════════════════════════════════════════════════════════════════

    pub fn check_state_consistency(&self) -> bool {
        self.read(|s| s.check_state_consistency())
    }

    /// Hex-encoded [`LedgerState::registry_digest`].
    pub fn registry_digest_hex(&self) -> String {
        hex::encode(self.read(|s| s.registry_digest()))
    }

    pub fn total_nodes(&self) -> u64 {
        self.read(|s| s.total_nodes())
    }

    pub fn user_node_count(&self, owner: &Address) -> u64 {
        self.read(|s| s.user_node_count(owner))
    }

    pub fn is_paused(&self) -> bool {
        self.read(|s| s.is_paused())
    }

    pub fn recent_events(&self, count: usize) -> Vec<LedgerEvent> {
        self.read(|s| s.recent_events(count))
    }
}
