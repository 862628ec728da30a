//! Property: registry counters stay consistent under random batches.
//!
//! Random batches mix valid nodes with invalid tiers, duplicate ids,
//! under-valued commodity nodes and zero owners. After every batch,
//! accepted or not:
//! - `sum(per_user) == total == number of records`
//! - `capacity_used` never exceeds the ceiling
//! - a rejected batch changes neither the counters nor the digest

use std::sync::Arc;

use pnode_chain::{
    Address, CallContext, DecreasingRewardCalculator, LedgerConfig, LedgerInit, LedgerState,
    NodeSpec, TokenBook,
};
use proptest::prelude::*;

fn addr(byte: u8) -> Address {
    Address::from_bytes([byte; 20])
}

fn fresh_state(max_capacity_units: u64) -> LedgerState {
    let config = LedgerConfig { max_capacity_units, ..LedgerConfig::default() };
    let init = LedgerInit {
        admin: addr(0xA0),
        treasury: addr(0xEE),
        reward_token: None,
        initial_signers: vec![addr(0x51)],
        threshold: 1,
    };
    LedgerState::initialize(
        config,
        init,
        Arc::new(DecreasingRewardCalculator::default()),
        TokenBook::new(),
    )
    .unwrap()
}

fn arb_spec() -> impl Strategy<Value = NodeSpec> {
    (0u64..40, 0u8..5, 0u8..6, any::<bool>(), 1u64..500, prop::bool::weighted(0.8)).prop_map(
        |(id, owner, node_type, is_active, capacity, rich)| NodeSpec {
            id,
            // owner 0 is the null account
            owner: addr(owner),
            is_active,
            node_type,
            capacity,
            monetary_value: if rich { 2_000_000 } else { 10 },
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn counters_consistent_after_random_batches(
        max_units in 5u64..60,
        batches in prop::collection::vec(prop::collection::vec(arb_spec(), 0..6), 1..12),
    ) {
        let mut state = fresh_state(max_units);
        let ctx = CallContext::new(addr(0xA0), 1_700_000_000, 1);

        for batch in &batches {
            let before_total = state.total_nodes();
            let before_digest = state.registry_digest();

            match state.register_nodes(&ctx, batch) {
                Ok(ids) => {
                    prop_assert_eq!(state.total_nodes(), before_total + ids.len() as u64);
                }
                Err(_) => {
                    prop_assert_eq!(state.total_nodes(), before_total);
                    prop_assert_eq!(state.registry_digest(), before_digest);
                }
            }

            prop_assert!(state.check_state_consistency());
            let per_user_sum: u64 = state.counters().per_user.values().sum();
            prop_assert_eq!(per_user_sum, state.total_nodes());
            prop_assert!(state.capacity_used() <= max_units);
        }
    }

    #[test]
    fn range_query_matches_ownership(
        specs in prop::collection::vec(arb_spec(), 0..20),
        from in 0u64..40,
        span in 0u64..40,
    ) {
        let mut state = fresh_state(100_000);
        let ctx = CallContext::new(addr(0xA0), 1_700_000_000, 1);
        // Register one at a time so invalid entries do not sink the rest.
        for spec in &specs {
            let _ = state.register_nodes(&ctx, std::slice::from_ref(spec));
        }

        let owner = addr(1);
        let to = from + span;
        let found = state.get_nodes_in_range(&owner, from, to);

        prop_assert!(found.windows(2).all(|w| w[0].id < w[1].id));
        prop_assert!(found.iter().all(|n| n.owner == owner && n.id >= from && n.id <= to));
        let expected = (from..=to)
            .filter(|id| state.get_node(*id).map(|n| n.owner == owner).unwrap_or(false))
            .count();
        prop_assert_eq!(found.len(), expected);
    }
}
