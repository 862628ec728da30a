//! # Ledger State
//!
//! `LedgerState` is the single aggregate that owns every piece of mutable
//! ledger data. Logic is split across `internal_*` modules, each adding an
//! `impl LedgerState` block for one component.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      mod.rs (FACADE)                            │
//! │  - LedgerState struct definition                                │
//! │  - initialize()                                                 │
//! │  - Public re-exports                                            │
//! └─────────────────────────────────────────────────────────────────┘
//!                                 │
//!                                 ▼
//!                       ┌──────────────────┐
//!                       │  Access Policy   │  every operation enters here
//!                       └────────┬─────────┘
//!          ┌─────────────────────┼──────────────────────┐
//!          ▼                     ▼                      ▼
//!  ┌──────────────┐      ┌──────────────┐       ┌──────────────┐
//!  │    Node      │─────►│    Reward    │       │   Treasury   │
//!  │   Registry   │      │    Ledger    │       │   Multisig   │
//!  └──────┬───────┘      └──────┬───────┘       └──────┬───────┘
//!         │                     └──────────┬───────────┘
//!         ▼                                ▼
//!  ┌──────────────┐               ┌──────────────────┐
//!  │ Consistency/ │               │  Token book      │
//!  │    View      │               │  (treasury funds)│
//!  └──────────────┘               └──────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! | Module | Function |
//! |--------|----------|
//! | `internal_model` | Records and operation inputs |
//! | `internal_access` | Role resolution: `require_*` |
//! | `internal_registry` | `register_nodes`, `get_nodes_in_range`, administrative `create_node` / `deploy_node` |
//! | `internal_rewards` | `distribute_rewards`, `configure_reward` |
//! | `internal_treasury` | Withdrawal proposals, `deposit_token` |
//! | `internal_governance` | Whitelist, pause flag, signer sets, reward token |
//! | `internal_view` | `check_state_consistency`, `registry_digest`, read accessors |
//! | `internal_events` | Bounded event log |
//!
//! ## Atomicity
//!
//! Every operation validates fully before its first mutation. Operations
//! that call a token collaborator commit their own state transition first
//! (proposal executed, user rewarded) and only then issue the transfer.
//! If the transfer fails the operation returns an error; the `Ledger`
//! facade then discards the whole working copy, so no partial state is
//! ever committed.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use pnode_common::{
    Address, LedgerConfig, LedgerError, LedgerResult, Operations, SignerSet, Withdrawal,
};
use tracing::info;

use crate::reward_calculator::RewardCalculator;
use crate::token::TokenBook;

// ════════════════════════════════════════════════════════════════════════════
// INTERNAL MODULES
// ════════════════════════════════════════════════════════════════════════════

/// Records and operation inputs: NodeRecord, WithdrawalProposal, CallContext, ...
mod internal_model;

/// Access policy: require_admin_or_whitelisted, require_op_signer, require_withdraw_signer
mod internal_access;

/// Node registry: register_nodes, get_nodes_in_range, create_node, deploy_node
mod internal_registry;

/// Reward ledger: distribute_rewards, configure_reward, pending_reward
mod internal_rewards;

/// Treasury multisig: propose/confirm/execute withdrawal, deposit_token
mod internal_treasury;

/// Governance: whitelist, pause, signer set management, reward token
mod internal_governance;

/// Consistency and views: check_state_consistency, registry_digest
mod internal_view;

/// Event log: LedgerEvent, recent_events
mod internal_events;

#[cfg(test)]
mod tests;

// ════════════════════════════════════════════════════════════════════════════
// PUBLIC RE-EXPORTS
// ════════════════════════════════════════════════════════════════════════════

pub use internal_model::{
    CallContext, DeployedNode, LedgerInit, NodeInfo, NodeRecord, NodeSpec, RegistryCounters,
    RewardBatchReport, RewardPayout, RewardStatus, Role, WithdrawalProposal,
};
pub use internal_events::{LedgerEvent, LedgerEventKind};

// ════════════════════════════════════════════════════════════════════════════
// LEDGER STATE
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct LedgerState {
    pub(crate) config: LedgerConfig,

    // ── Roles ────────────────────────────────────────────────────────────
    pub(crate) admin: Address,
    /// Registry callers other than the administrator.
    pub(crate) whitelist: HashMap<Address, bool>,
    pub(crate) op_signers: SignerSet<Operations>,
    pub(crate) withdraw_signers: SignerSet<Withdrawal>,

    // ── Node registry ────────────────────────────────────────────────────
    pub(crate) nodes: BTreeMap<u64, NodeRecord>,
    /// Reverse index: owner → node ids. Mirrors `nodes` exactly.
    pub(crate) owner_nodes: HashMap<Address, BTreeSet<u64>>,
    pub(crate) counters: RegistryCounters,
    /// Administrative namespace, index == position.
    pub(crate) deployed_nodes: Vec<DeployedNode>,

    // ── Reward ledger ────────────────────────────────────────────────────
    pub(crate) calculator: Arc<dyn RewardCalculator>,
    pub(crate) reward_token: Option<Address>,
    pub(crate) reward_status: HashMap<(Address, u32), RewardStatus>,
    /// Most recent reward time per user, across all years.
    pub(crate) last_reward_time: HashMap<Address, u64>,
    pub(crate) paused: bool,

    // ── Treasury ─────────────────────────────────────────────────────────
    /// The ledger's own account in every token.
    pub(crate) treasury: Address,
    pub(crate) tokens: TokenBook,
    pub(crate) proposals: BTreeMap<u64, WithdrawalProposal>,
    pub(crate) next_proposal_id: u64,

    // ── Events ───────────────────────────────────────────────────────────
    pub(crate) events: VecDeque<LedgerEvent>,
}

impl fmt::Debug for LedgerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerState")
            .field("admin", &self.admin)
            .field("treasury", &self.treasury)
            .field("total_nodes", &self.counters.total)
            .field("capacity_used", &self.counters.capacity_used)
            .field("proposals", &self.proposals.len())
            .field("paused", &self.paused)
            .finish()
    }
}

impl LedgerState {
    /// Build a ledger.
    ///
    /// ## Errors
    ///
    /// - `ZeroAddress` if `admin` or `treasury` is the null account, or a signer is.
    /// - `InvalidThreshold` / `AlreadySigner` for a malformed signer list.
    /// - `UnknownToken` if `reward_token` is not registered in `tokens`.
    pub fn initialize(
        config: LedgerConfig,
        init: LedgerInit,
        calculator: Arc<dyn RewardCalculator>,
        tokens: TokenBook,
    ) -> LedgerResult<Self> {
        if init.admin.is_zero() || init.treasury.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        let op_signers = SignerSet::<Operations>::new(&init.initial_signers, init.threshold)?;
        let withdraw_signers = SignerSet::<Withdrawal>::new(&init.initial_signers, init.threshold)?;
        if let Some(token) = init.reward_token {
            if !tokens.contains(&token) {
                return Err(LedgerError::UnknownToken(token));
            }
        }

        info!(
            admin = %init.admin,
            treasury = %init.treasury,
            signers = init.initial_signers.len(),
            threshold = init.threshold,
            "ledger initialized"
        );

        Ok(Self {
            config,
            admin: init.admin,
            whitelist: HashMap::new(),
            op_signers,
            withdraw_signers,
            nodes: BTreeMap::new(),
            owner_nodes: HashMap::new(),
            counters: RegistryCounters::default(),
            deployed_nodes: Vec::new(),
            calculator,
            reward_token: init.reward_token,
            reward_status: HashMap::new(),
            last_reward_time: HashMap::new(),
            paused: false,
            treasury: init.treasury,
            tokens,
            proposals: BTreeMap::new(),
            next_proposal_id: 0,
            events: VecDeque::new(),
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Token contracts known to the ledger.
    pub fn tokens(&self) -> &TokenBook {
        &self.tokens
    }

    /// Mutable token book, for wiring collaborators and test setup.
    pub fn tokens_mut(&mut self) -> &mut TokenBook {
        &mut self.tokens
    }
}
