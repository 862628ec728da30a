//! # Ledger Events
//!
//! Confirmation signals for external indexers. Every successful mutating
//! operation appends exactly one event.
//!
//! - Events live in a bounded in-memory buffer (`LedgerConfig::max_events`);
//!   the oldest event is dropped first.
//! - Events are observations only. Nothing in the ledger reads them back.
//! - Each event is also written to `tracing` at debug level.

use pnode_common::{Address, SignerDomain};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{LedgerState, RewardPayout};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEventKind {
    NodesRegistered {
        node_ids: Vec<u64>,
    },
    NodeDeployed {
        index: u64,
    },
    RewardDistributed {
        user: Address,
        year: u32,
        amount: u128,
    },
    BatchRewardsDistributed {
        year: u32,
        paid: Vec<RewardPayout>,
    },
    WhitelistUpdated {
        account: Address,
        allowed: bool,
    },
    PauseChanged {
        paused: bool,
    },
    WithdrawalProposed {
        proposal_id: u64,
        token: Address,
        to: Address,
        amount: u128,
    },
    WithdrawalConfirmed {
        proposal_id: u64,
        confirmations: u32,
    },
    WithdrawalExecuted {
        proposal_id: u64,
        token: Address,
        to: Address,
        amount: u128,
    },
    TokenDeposited {
        token: Address,
        amount: u128,
    },
    SignerAdded {
        domain: SignerDomain,
        signer: Address,
    },
    SignerRemoved {
        domain: SignerDomain,
        signer: Address,
    },
    ThresholdUpdated {
        domain: SignerDomain,
        threshold: u32,
    },
    RewardTokenUpdated {
        token: Address,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    pub kind: LedgerEventKind,
    /// Caller of the operation that produced the event.
    pub actor: Address,
    pub timestamp: u64,
}

impl LedgerState {
    pub(crate) fn emit(&mut self, actor: Address, timestamp: u64, kind: LedgerEventKind) {
        debug!(actor = %actor, timestamp, event = ?kind, "ledger event");
        self.events.push_back(LedgerEvent {
            kind,
            actor,
            timestamp,
        });
        while self.events.len() > self.config.max_events {
            self.events.pop_front();
        }
    }

    /// Most recent `count` events, oldest first.
    pub fn recent_events(&self, count: usize) -> Vec<LedgerEvent> {
        let skip = self.events.len().saturating_sub(count);
        self.events.iter().skip(skip).cloned().collect()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}
