//! # Ledger Data Structures
//!
//! Records owned by the ledger state and the inputs accepted by its
//! operations.
//!
//! | Type | Owner | Notes |
//! |------|-------|-------|
//! | `NodeRecord` | Node Registry | never deleted, id permanently reserved |
//! | `RegistryCounters` | Node Registry | `sum(per_user) == total` between operations |
//! | `DeployedNode` | Administrative namespace | independent from the registry counters |
//! | `RewardStatus` | Reward Ledger | created lazily per (user, year) |
//! | `WithdrawalProposal` | Treasury Controller | `Proposed → Executed`, never deleted |

use pnode_common::{Address, NodeType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ════════════════════════════════════════════════════════════════════════════
// CALL CONTEXT
// ════════════════════════════════════════════════════════════════════════════

/// Who is calling, and when.
///
/// Every mutating operation receives one. Timestamps and block heights are
/// supplied by the caller; the ledger never reads a clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    pub caller: Address,
    /// Unix timestamp (seconds).
    pub timestamp: u64,
    pub block_height: u64,
}

impl CallContext {
    pub fn new(caller: Address, timestamp: u64, block_height: u64) -> Self {
        Self {
            caller,
            timestamp,
            block_height,
        }
    }
}

/// Role resolved by the access policy for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Administrator,
    Whitelisted,
    OperationsSigner,
    WithdrawalSigner,
}

// ════════════════════════════════════════════════════════════════════════════
// NODE REGISTRY
// ════════════════════════════════════════════════════════════════════════════

/// Registration input for one node.
///
/// `node_type` stays raw so that out-of-range values reach validation and
/// fail with `InvalidNodeType` instead of being unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: u64,
    /// Staking address the node is committed against.
    pub owner: Address,
    pub is_active: bool,
    pub node_type: u8,
    pub capacity: u64,
    pub monetary_value: u128,
}

/// A registered physical node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: u64,
    pub owner: Address,
    pub is_active: bool,
    pub node_type: NodeType,
    pub capacity: u64,
    pub monetary_value: u128,
    /// Timestamp of the registering call.
    pub created_at: u64,
    /// Block height of the registering call.
    pub origin_block: u64,
}

impl NodeRecord {
    /// Weight this node contributes to its owner's reward.
    pub fn reward_weight(&self) -> u64 {
        self.node_type.reward_weight(self.capacity)
    }
}

/// Per-user and global node counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryCounters {
    pub per_user: BTreeMap<Address, u64>,
    pub total: u64,
    /// Weighted consumption of the global capacity ceiling.
    pub capacity_used: u64,
}

// ════════════════════════════════════════════════════════════════════════════
// ADMINISTRATIVE NODES
// ════════════════════════════════════════════════════════════════════════════

/// Input of the administrative `create_node` operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub ip: String,
    pub describe: String,
    pub name: String,
    pub is_active: bool,
    pub node_type: u8,
    pub capacity: u64,
}

/// Server node deployed by the administrator, looked up by index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedNode {
    pub index: u64,
    pub ip: String,
    pub describe: String,
    pub name: String,
    pub is_active: bool,
    pub node_type: NodeType,
    pub capacity: u64,
    pub created_at: u64,
    pub origin_block: u64,
}

// ════════════════════════════════════════════════════════════════════════════
// REWARDS
// ════════════════════════════════════════════════════════════════════════════

/// Reward record of one (user, year).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardStatus {
    pub rewarded: bool,
    /// Timestamp of the reward.
    pub last_time: u64,
    /// Amount paid, `0` for users without active nodes.
    pub amount: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPayout {
    pub user: Address,
    pub amount: u128,
}

/// Outcome of a reward batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardBatchReport {
    pub year: u32,
    /// Users that received a non-zero amount, in batch order.
    pub paid: Vec<RewardPayout>,
    /// Eligible users without active nodes; marked rewarded with amount 0.
    pub zero_amount: Vec<Address>,
    /// Users skipped as already rewarded or cooling down.
    pub skipped: Vec<Address>,
}

impl RewardBatchReport {
    pub fn total_paid(&self) -> u128 {
        self.paid.iter().map(|p| p.amount).sum()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TREASURY
// ════════════════════════════════════════════════════════════════════════════

/// Request to move treasury funds, gated by withdrawal signer confirmations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalProposal {
    pub id: u64,
    pub token: Address,
    pub to: Address,
    pub amount: u128,
    pub proposer: Address,
    pub created_at: u64,
    pub confirmations: u32,
    /// Signers that confirmed. Entries survive signer removal.
    pub confirmed_by: BTreeSet<Address>,
    pub executed: bool,
    pub executed_at: Option<u64>,
}

impl WithdrawalProposal {
    pub fn is_confirmed_by(&self, signer: &Address) -> bool {
        self.confirmed_by.contains(signer)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// INITIALIZATION
// ════════════════════════════════════════════════════════════════════════════

/// Parameters of `LedgerState::initialize`.
///
/// Both signer sets start from `initial_signers` and `threshold`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerInit {
    pub admin: Address,
    /// The ledger's own account; holds treasury balances in every token.
    pub treasury: Address,
    /// Token rewards are paid in. May be configured later.
    pub reward_token: Option<Address>,
    pub initial_signers: Vec<Address>,
    pub threshold: u32,
}
