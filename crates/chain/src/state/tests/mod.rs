//! Unit tests for `LedgerState`, one file per component.
//!
//! Shared fixture: BKC reward token at `0xB0..`, treasury funded with
//! `TREASURY_FUNDS`, signers `0x51..=0x53` with threshold 2, and a
//! calculator paying 1_000 per weight unit in year 1, minus 10% a year.

use std::sync::Arc;

use pnode_common::{Address, LedgerConfig};

use crate::reward_calculator::DecreasingRewardCalculator;
use crate::state::{CallContext, LedgerInit, LedgerState, NodeSpec};
use crate::token::{InMemoryToken, TokenBook};

mod governance_tests;

pub(super) const T0: u64 = 1_700_000_000;
pub(super) const DAY: u64 = 86_400;
pub(super) const TREASURY_FUNDS: u128 = 1_000_000_000;
pub(super) const ADMIN_FUNDS: u128 = 5_000_000;

pub(super) fn addr(byte: u8) -> Address {
    Address::from_bytes([byte; 20])
}

pub(super) fn admin() -> Address {
    addr(0xA0)
}

pub(super) fn treasury() -> Address {
    addr(0xEE)
}

pub(super) fn bkc() -> Address {
    addr(0xB0)
}

pub(super) fn signers() -> [Address; 3] {
    [addr(0x51), addr(0x52), addr(0x53)]
}

pub(super) fn ctx(caller: Address, timestamp: u64) -> CallContext {
    CallContext::new(caller, timestamp, timestamp / 12)
}

pub(super) fn funded_book() -> TokenBook {
    let mut token = InMemoryToken::new("BKC");
    token.mint(&treasury(), TREASURY_FUNDS).unwrap();
    token.mint(&admin(), ADMIN_FUNDS).unwrap();
    let mut book = TokenBook::new();
    book.register(bkc(), Box::new(token));
    book
}

pub(super) fn new_state_with(config: LedgerConfig) -> LedgerState {
    let init = LedgerInit {
        admin: admin(),
        treasury: treasury(),
        reward_token: Some(bkc()),
        initial_signers: signers().to_vec(),
        threshold: 2,
    };
    LedgerState::initialize(
        config,
        init,
        Arc::new(DecreasingRewardCalculator::new(1_000, 10)),
        funded_book(),
    )
    .unwrap()
}

pub(super) fn new_state() -> LedgerState {
    new_state_with(LedgerConfig::default())
}

/// Active node; commodity nodes carry exactly the minimum value.
pub(super) fn node(id: u64, owner: Address, node_type: u8, capacity: u64) -> NodeSpec {
    NodeSpec {
        id,
        owner,
        is_active: true,
        node_type,
        capacity,
        monetary_value: if node_type == 4 { 1_000_000 } else { 0 },
    }
}
