//! # Token Collaborator
//!
//! The ledger never keeps balances itself. Every movement of funds goes
//! through a [`TokenLedger`], the fungible-token contract the treasury
//! holds balances in (`transfer` / `approve` / `transfer_from` /
//! `balance_of`).
//!
//! ## Failure Semantics
//!
//! Some tokens report failure by returning `false` instead of erroring.
//! The ledger treats `Ok(false)` exactly like `Err(_)`: see
//! [`settle_transfer`].
//!
//! ## Snapshots
//!
//! Token ledgers are cloneable through [`TokenLedger::box_clone`] so the
//! `Ledger` facade can run an operation against a working copy and discard
//! it, token balances included, when the operation fails.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

use pnode_common::{Address, LedgerError, LedgerResult};

// ════════════════════════════════════════════════════════════════════════════
// TOKEN ERROR
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: u128, available: u128 },

    #[error("insufficient allowance: required {required}, approved {approved}")]
    InsufficientAllowance { required: u128, approved: u128 },

    #[error("balance overflow")]
    Overflow,

    #[error("transfer rejected: {0}")]
    Rejected(String),
}

// ════════════════════════════════════════════════════════════════════════════
// TOKEN LEDGER TRAIT
// ════════════════════════════════════════════════════════════════════════════

/// Fungible token contract as seen by the ledger.
pub trait TokenLedger: fmt::Debug + Send + Sync {
    fn balance_of(&self, account: &Address) -> u128;

    fn allowance(&self, owner: &Address, spender: &Address) -> u128;

    /// Move `amount` from `from` to `to`. `from` is the authorizing account.
    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<bool, TokenError>;

    fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) -> Result<bool, TokenError>;

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming allowance.
    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<bool, TokenError>;

    fn box_clone(&self) -> Box<dyn TokenLedger>;
}

impl Clone for Box<dyn TokenLedger> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Collapse a token call result into the ledger's error contract.
///
/// `Ok(false)` and `Err(_)` both become `LedgerError::TransferFailed`.
pub fn settle_transfer(token: Address, result: Result<bool, TokenError>) -> LedgerResult<()> {
    match result {
        Ok(true) => Ok(()),
        Ok(false) => Err(LedgerError::TransferFailed {
            token,
            reason: "token returned false".to_string(),
        }),
        Err(e) => Err(LedgerError::TransferFailed {
            token,
            reason: e.to_string(),
        }),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// IN-MEMORY TOKEN
// ════════════════════════════════════════════════════════════════════════════

/// Plain in-memory token with standard ERC-20 semantics.
///
/// `silent_failures` makes every transfer return `Ok(false)` without moving
/// funds, which is how non-reverting tokens signal failure. Blocked
/// accounts reject incoming transfers with [`TokenError::Rejected`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryToken {
    pub symbol: String,
    balances: BTreeMap<Address, u128>,
    allowances: BTreeMap<(Address, Address), u128>,
    total_supply: u128,
    silent_failures: bool,
    blocked: BTreeSet<Address>,
}

impl InMemoryToken {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    pub fn mint(&mut self, to: &Address, amount: u128) -> Result<(), TokenError> {
        let bal = self.balances.entry(*to).or_insert(0);
        *bal = bal.checked_add(amount).ok_or(TokenError::Overflow)?;
        self.total_supply = self.total_supply.checked_add(amount).ok_or(TokenError::Overflow)?;
        Ok(())
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn set_silent_failures(&mut self, on: bool) {
        self.silent_failures = on;
    }

    pub fn block_account(&mut self, account: Address) {
        self.blocked.insert(account);
    }

    fn move_balance(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), TokenError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                required: amount,
                available,
            });
        }
        if self.blocked.contains(to) {
            return Err(TokenError::Rejected(format!("account {} is blocked", to)));
        }
        if from == to {
            return Ok(());
        }
        let to_bal = self.balance_of(to);
        let new_to = to_bal.checked_add(amount).ok_or(TokenError::Overflow)?;
        self.balances.insert(*from, available - amount);
        self.balances.insert(*to, new_to);
        Ok(())
    }
}

impl TokenLedger for InMemoryToken {
    fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances.get(&(*owner, *spender)).copied().unwrap_or(0)
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<bool, TokenError> {
        if self.silent_failures {
            return Ok(false);
        }
        self.move_balance(from, to, amount)?;
        Ok(true)
    }

    fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) -> Result<bool, TokenError> {
        self.allowances.insert((*owner, *spender), amount);
        Ok(true)
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<bool, TokenError> {
        if self.silent_failures {
            return Ok(false);
        }
        let approved = self.allowance(from, spender);
        if approved < amount {
            return Err(TokenError::InsufficientAllowance {
                required: amount,
                approved,
            });
        }
        self.move_balance(from, to, amount)?;
        self.allowances.insert((*from, *spender), approved - amount);
        Ok(true)
    }

    fn box_clone(&self) -> Box<dyn TokenLedger> {
        Box::new(self.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TOKEN BOOK
// ════════════════════════════════════════════════════════════════════════════

/// Token contracts known to the ledger, keyed by token address.
#[derive(Debug, Clone, Default)]
pub struct TokenBook {
    tokens: BTreeMap<Address, Box<dyn TokenLedger>>,
}

impl TokenBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the contract behind `address`.
    pub fn register(&mut self, address: Address, token: Box<dyn TokenLedger>) {
        self.tokens.insert(address, token);
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.tokens.contains_key(address)
    }

    pub fn get(&self, address: &Address) -> LedgerResult<&dyn TokenLedger> {
        self.tokens
            .get(address)
            .map(|t| t.as_ref())
            .ok_or(LedgerError::UnknownToken(*address))
    }

    pub fn get_mut(&mut self, address: &Address) -> LedgerResult<&mut Box<dyn TokenLedger>> {
        self.tokens
            .get_mut(address)
            .ok_or(LedgerError::UnknownToken(*address))
    }

    /// Balance of `account` in `token`, `0` for unknown tokens.
    pub fn balance_of(&self, token: &Address, account: &Address) -> u128 {
        self.tokens
            .get(token)
            .map(|t| t.balance_of(account))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 20])
    }

    #[test]
    fn transfer_moves_balance() {
        let mut t = InMemoryToken::new("BKC");
        t.mint(&addr(1), 100).unwrap();
        assert_eq!(t.transfer(&addr(1), &addr(2), 40), Ok(true));
        assert_eq!(t.balance_of(&addr(1)), 60);
        assert_eq!(t.balance_of(&addr(2)), 40);
        assert_eq!(t.total_supply(), 100);
    }

    #[test]
    fn transfer_rejects_overdraft() {
        let mut t = InMemoryToken::new("BKC");
        t.mint(&addr(1), 10).unwrap();
        assert_eq!(
            t.transfer(&addr(1), &addr(2), 11),
            Err(TokenError::InsufficientBalance { required: 11, available: 10 })
        );
        assert_eq!(t.balance_of(&addr(1)), 10);
    }

    #[test]
    fn transfer_from_consumes_allowance() {
        let mut t = InMemoryToken::new("BKC");
        t.mint(&addr(1), 100).unwrap();
        t.approve(&addr(1), &addr(9), 50).unwrap();
        assert_eq!(t.transfer_from(&addr(9), &addr(1), &addr(2), 30), Ok(true));
        assert_eq!(t.allowance(&addr(1), &addr(9)), 20);
        assert!(matches!(
            t.transfer_from(&addr(9), &addr(1), &addr(2), 30),
            Err(TokenError::InsufficientAllowance { .. })
        ));
    }

    #[test]
    fn silent_failure_returns_false() {
        let mut t = InMemoryToken::new("USDT");
        t.mint(&addr(1), 100).unwrap();
        t.set_silent_failures(true);
        assert_eq!(t.transfer(&addr(1), &addr(2), 10), Ok(false));
        assert_eq!(t.balance_of(&addr(1)), 100);
    }

    #[test]
    fn settle_treats_false_as_failure() {
        assert!(settle_transfer(addr(7), Ok(true)).is_ok());
        assert!(matches!(
            settle_transfer(addr(7), Ok(false)),
            Err(LedgerError::TransferFailed { .. })
        ));
        assert!(matches!(
            settle_transfer(addr(7), Err(TokenError::Overflow)),
            Err(LedgerError::TransferFailed { .. })
        ));
    }

    #[test]
    fn token_book_clone_is_independent() {
        let mut book = TokenBook::new();
        let mut t = InMemoryToken::new("BKC");
        t.mint(&addr(1), 100).unwrap();
        book.register(addr(0xAA), Box::new(t));

        let snapshot = book.clone();
        book.get_mut(&addr(0xAA))
            .unwrap()
            .transfer(&addr(1), &addr(2), 100)
            .unwrap();

        assert_eq!(book.balance_of(&addr(0xAA), &addr(1)), 0);
        assert_eq!(snapshot.balance_of(&addr(0xAA), &addr(1)), 100);
        assert_eq!(book.get(&addr(0xBB)).unwrap_err(), LedgerError::UnknownToken(addr(0xBB)));
    }
}
