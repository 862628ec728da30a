//! Governance: whitelist, pause, signer sets, reward token, initialization
//! and the event log.

use std::sync::Arc;

use pnode_common::{LedgerConfig, LedgerError, SignerDomain};

use super::{addr, admin, bkc, ctx, funded_book, new_state, new_state_with, signers, treasury, T0};
use crate::reward_calculator::DecreasingRewardCalculator;
use crate::state::{LedgerEventKind, LedgerInit, LedgerState};
use crate::token::InMemoryToken;

fn init_with(signers: Vec<pnode_common::Address>, threshold: u32) -> LedgerInit {
    LedgerInit {
        admin: admin(),
        treasury: treasury(),
        reward_token: Some(bkc()),
        initial_signers: signers,
        threshold,
    }
}

fn try_init(init: LedgerInit) -> Result<LedgerState, LedgerError> {
    LedgerState::initialize(
        LedgerConfig::default(),
        init,
        Arc::new(DecreasingRewardCalculator::default()),
        funded_book(),
    )
}

// ════════════════════════════════════════════════════════════════════════════
// INITIALIZATION
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn test_initialize_sets_both_signer_sets() {
    let state = new_state();
    for s in signers() {
        assert!(state.is_op_signer(&s));
        assert!(state.is_withdraw_signer(&s));
    }
    assert_eq!(state.op_threshold(), 2);
    assert_eq!(state.withdraw_threshold(), 2);
    assert_eq!(state.admin(), admin());
    assert_eq!(state.reward_token(), Some(bkc()));
    assert!(!state.is_paused());
    assert!(state.check_state_consistency());
}

#[test]
fn test_initialize_rejects_bad_input() {
    let sig = signers().to_vec();

    let err = try_init(init_with(sig.clone(), 0)).unwrap_err();
    assert_eq!(err, LedgerError::InvalidThreshold { threshold: 0, members: 3 });

    let err = try_init(init_with(sig.clone(), 4)).unwrap_err();
    assert_eq!(err, LedgerError::InvalidThreshold { threshold: 4, members: 3 });

    let err = try_init(init_with(vec![addr(0x51), addr(0)], 1)).unwrap_err();
    assert_eq!(err, LedgerError::ZeroAddress);

    let err = try_init(init_with(vec![addr(0x51), addr(0x51)], 1)).unwrap_err();
    assert_eq!(err, LedgerError::AlreadySigner(addr(0x51)));

    let err = try_init(LedgerInit { admin: addr(0), ..init_with(sig.clone(), 2) }).unwrap_err();
    assert_eq!(err, LedgerError::ZeroAddress);

    let err = try_init(LedgerInit { reward_token: Some(addr(0xDD)), ..init_with(sig, 2) }).unwrap_err();
    assert_eq!(err, LedgerError::UnknownToken(addr(0xDD)));
}

// ════════════════════════════════════════════════════════════════════════════
// WHITELIST & PAUSE
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn test_whitelist_by_op_signer_only() {
    let mut state = new_state();
    let user = addr(0x01);

    let err = state.set_whitelist(&ctx(admin(), T0), user, true).unwrap_err();
    assert_eq!(err, LedgerError::Unauthorized { caller: admin() });

    state.set_whitelist(&ctx(signers()[0], T0), user, true).unwrap();
    assert!(state.is_whitelisted(&user));
    assert_eq!(
        state.recent_events(1)[0].kind,
        LedgerEventKind::WhitelistUpdated { account: user, allowed: true }
    );

    state.set_whitelist(&ctx(signers()[1], T0), user, false).unwrap();
    assert!(!state.is_whitelisted(&user));
}

#[test]
fn test_pause_by_signer_or_admin() {
    let mut state = new_state();

    state.pause_rewards(&ctx(signers()[0], T0)).unwrap();
    assert!(state.is_paused());
    state.unpause_rewards(&ctx(admin(), T0)).unwrap();
    assert!(!state.is_paused());

    let err = state.pause_rewards(&ctx(addr(0x77), T0)).unwrap_err();
    assert!(matches!(err, LedgerError::Unauthorized { .. }));
    assert!(!state.is_paused());
}

// ════════════════════════════════════════════════════════════════════════════
// SIGNER SETS
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn test_op_signer_management() {
    let mut state = new_state();
    let [s1, _, s3] = signers();
    let newcomer = addr(0x54);

    state.add_op_signer(&ctx(s1, T0), newcomer).unwrap();
    assert!(state.is_op_signer(&newcomer));
    assert_eq!(
        state.recent_events(1)[0].kind,
        LedgerEventKind::SignerAdded { domain: SignerDomain::Operations, signer: newcomer }
    );

    assert_eq!(
        state.add_op_signer(&ctx(s1, T0), newcomer).unwrap_err(),
        LedgerError::AlreadySigner(newcomer)
    );

    state.remove_op_signer(&ctx(s1, T0), s3).unwrap();
    assert!(!state.is_op_signer(&s3));
    assert_eq!(
        state.remove_op_signer(&ctx(s1, T0), s3).unwrap_err(),
        LedgerError::NotSigner(s3)
    );

    state.update_op_threshold(&ctx(s1, T0), 3).unwrap();
    assert_eq!(state.op_threshold(), 3);
    assert_eq!(state.op_signers().len(), 3);

    // Withdrawal set is untouched.
    assert!(state.is_withdraw_signer(&s3));
    assert!(!state.is_withdraw_signer(&newcomer));
    assert_eq!(state.withdraw_threshold(), 2);
}

#[test]
fn test_removal_below_threshold_rejected() {
    let mut state = new_state();
    let [s1, s2, s3] = signers();
    state.update_op_threshold(&ctx(s1, T0), 3).unwrap();

    let err = state.remove_op_signer(&ctx(s1, T0), s2).unwrap_err();
    assert_eq!(err, LedgerError::InvalidThreshold { threshold: 3, members: 2 });
    assert!(state.is_op_signer(&s2));

    assert!(matches!(
        state.update_op_threshold(&ctx(s3, T0), 0),
        Err(LedgerError::InvalidThreshold { .. })
    ));
    assert!(matches!(
        state.update_op_threshold(&ctx(s3, T0), 4),
        Err(LedgerError::InvalidThreshold { .. })
    ));
}

#[test]
fn test_signer_domains_are_separate() {
    let mut state = new_state();
    let [s1, _, _] = signers();
    let op_only = addr(0x54);
    state.add_op_signer(&ctx(s1, T0), op_only).unwrap();

    let err = state.add_withdraw_signer(&ctx(op_only, T0), addr(0x55)).unwrap_err();
    assert_eq!(err, LedgerError::Unauthorized { caller: op_only });

    let err = state.update_withdraw_threshold(&ctx(op_only, T0), 1).unwrap_err();
    assert!(matches!(err, LedgerError::Unauthorized { .. }));

    state.add_withdraw_signer(&ctx(s1, T0), addr(0x55)).unwrap();
    assert!(state.is_withdraw_signer(&addr(0x55)));
    assert!(!state.is_op_signer(&addr(0x55)));
}

// ════════════════════════════════════════════════════════════════════════════
// REWARD TOKEN
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn test_set_reward_token() {
    let mut state = new_state();
    let usdt = addr(0xC0);

    let err = state.set_reward_token(&ctx(admin(), T0), usdt).unwrap_err();
    assert_eq!(err, LedgerError::UnknownToken(usdt));

    state.tokens_mut().register(usdt, Box::new(InMemoryToken::new("USDT")));
    let err = state.set_reward_token(&ctx(signers()[0], T0), usdt).unwrap_err();
    assert!(matches!(err, LedgerError::Unauthorized { .. }));

    state.set_reward_token(&ctx(admin(), T0), usdt).unwrap();
    assert_eq!(state.reward_token(), Some(usdt));
}

// ════════════════════════════════════════════════════════════════════════════
// EVENT LOG
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn test_event_log_is_bounded() {
    let config = LedgerConfig { max_events: 3, ..LedgerConfig::default() };
    let mut state = new_state_with(config);
    let [s1, _, _] = signers();

    for i in 0..5u8 {
        state.set_whitelist(&ctx(s1, T0 + u64::from(i)), addr(0x10 + i), true).unwrap();
    }

    assert_eq!(state.event_count(), 3);
    let events = state.recent_events(10);
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].timestamp, T0 + 2);
    assert_eq!(events[2].timestamp, T0 + 4);
    assert_eq!(events[2].actor, s1);
}
