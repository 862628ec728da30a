//! # Consistency & Views
//!
//! Read-only access to the ledger. Nothing here mutates state.
//!
//! ## Registry Digest
//!
//! `registry_digest` hashes the registry in a fixed byte layout so two
//! ledgers holding the same nodes produce the same digest:
//!
//! ```text
//! "pnode-registry-v1"
//! for node in nodes (ascending id):
//!     id(8 BE) | owner(20) | is_active(1) | node_type(1)
//!     | capacity(8 BE) | monetary_value(16 BE) | created_at(8 BE) | origin_block(8 BE)
//! for (owner, count) in per_user (ascending owner):
//!     owner(20) | count(8 BE)
//! total(8 BE) | capacity_used(8 BE)
//! ```

use sha3::{Digest, Sha3_256};

use pnode_common::Address;

use super::{LedgerState, RegistryCounters};

const REGISTRY_DIGEST_TAG: &[u8] = b"pnode-registry-v1";

impl LedgerState {
    // ════════════════════════════════════════════════════════════════════════════
    // CONSISTENCY
    // ════════════════════════════════════════════════════════════════════════════

    /// `true` iff the per-user counters sum to the global total and the
    /// owner index mirrors the node map.
    pub fn check_state_consistency(&self) -> bool {
        let sum: u128 = self.counters.per_user.values().map(|&c| c as u128).sum();
        if sum != self.counters.total as u128 {
            return false;
        }
        if self.nodes.len() as u128 != sum {
            return false;
        }
        let indexed: usize = self.owner_nodes.values().map(|ids| ids.len()).sum();
        if indexed != self.nodes.len() {
            return false;
        }
        self.owner_nodes.iter().all(|(owner, ids)| {
            ids.iter()
                .all(|id| self.nodes.get(id).map(|n| n.owner == *owner).unwrap_or(false))
        })
    }

    /// SHA3-256 digest of the registry, for external audit.
    pub fn registry_digest(&self) -> [u8; 32] {
        let mut hasher = Sha3_256::new();
        hasher.update(REGISTRY_DIGEST_TAG);

        for node in self.nodes.values() {
            hasher.update(node.id.to_be_bytes());
            hasher.update(node.owner.as_bytes());
            hasher.update([node.is_active as u8, node.node_type.as_u8()]);
            hasher.update(node.capacity.to_be_bytes());
            hasher.update(node.monetary_value.to_be_bytes());
            hasher.update(node.created_at.to_be_bytes());
            hasher.update(node.origin_block.to_be_bytes());
        }
        for (owner, count) in &self.counters.per_user {
            hasher.update(owner.as_bytes());
            hasher.update(count.to_be_bytes());
        }
        hasher.update(self.counters.total.to_be_bytes());
        hasher.update(self.counters.capacity_used.to_be_bytes());

        hasher.finalize().into()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ════════════════════════════════════════════════════════════════════════════

    #[inline]
    pub fn total_nodes(&self) -> u64 {
        self.counters.total
    }

    pub fn user_node_count(&self, owner: &Address) -> u64 {
        self.counters.per_user.get(owner).copied().unwrap_or(0)
    }

    #[inline]
    pub fn capacity_used(&self) -> u64 {
        self.counters.capacity_used
    }

    pub fn counters(&self) -> &RegistryCounters {
        &self.counters
    }

    pub fn is_whitelisted(&self, account: &Address) -> bool {
        self.whitelist.get(account).copied().unwrap_or(false)
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_op_signer(&self, account: &Address) -> bool {
        self.op_signers.contains(account)
    }

    pub fn is_withdraw_signer(&self, account: &Address) -> bool {
        self.withdraw_signers.contains(account)
    }

    pub fn op_threshold(&self) -> u32 {
        self.op_signers.threshold()
    }

    pub fn withdraw_threshold(&self) -> u32 {
        self.withdraw_signers.threshold()
    }

    /// Operations signers in ascending address order.
    pub fn op_signers(&self) -> Vec<Address> {
        self.op_signers.members().copied().collect()
    }

    /// Withdrawal signers in ascending address order.
    pub fn withdraw_signers(&self) -> Vec<Address> {
        self.withdraw_signers.members().copied().collect()
    }

    #[inline]
    pub fn admin(&self) -> Address {
        self.admin
    }

    #[inline]
    pub fn treasury(&self) -> Address {
        self.treasury
    }

    #[inline]
    pub fn reward_token(&self) -> Option<Address> {
        self.reward_token
    }
}
