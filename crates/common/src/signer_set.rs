//! # M-of-N Signer Sets
//!
//! The ledger runs two signer sets with independent authority:
//!
//! | Domain | Governs |
//! |--------|---------|
//! | [`Operations`] | whitelist, pause flag, operations signer set |
//! | [`Withdrawal`] | treasury withdrawal proposals, withdrawal signer set |
//!
//! Both are the same [`SignerSet`] type parameterized by an
//! [`AuthorityDomain`] marker, so a withdrawal signer set can never be
//! passed where an operations signer set is expected even when the two
//! share members.
//!
//! ## Invariant
//!
//! `1 <= threshold <= members.len()` holds after every successful call.
//! Mutations that would break it fail with `LedgerError::InvalidThreshold`
//! and leave the set unchanged.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::marker::PhantomData;

use crate::error::{LedgerError, LedgerResult};
use crate::types::Address;

// ════════════════════════════════════════════════════════════════════════════════
// AUTHORITY DOMAINS
// ════════════════════════════════════════════════════════════════════════════════

/// Marker for the kind of operation a signer set gates.
pub trait AuthorityDomain {
    /// Short name used in logs and events.
    const NAME: &'static str;
}

/// Operations governance: whitelist, pause and operations signer management.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Operations;

/// Treasury governance: withdrawal proposals and withdrawal signer management.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Withdrawal;

impl AuthorityDomain for Operations {
    const NAME: &'static str = "operations";
}

impl AuthorityDomain for Withdrawal {
    const NAME: &'static str = "withdrawal";
}

/// Runtime tag for a domain, carried in events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignerDomain {
    Operations,
    Withdrawal,
}

impl fmt::Display for SignerDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignerDomain::Operations => write!(f, "{}", Operations::NAME),
            SignerDomain::Withdrawal => write!(f, "{}", Withdrawal::NAME),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// SIGNER SET
// ════════════════════════════════════════════════════════════════════════════════

/// An M-of-N signer set for one authority domain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerSet<D> {
    members: BTreeSet<Address>,
    threshold: u32,
    #[serde(skip)]
    _domain: PhantomData<D>,
}

impl<D: AuthorityDomain> SignerSet<D> {
    /// Build a signer set.
    ///
    /// ## Errors
    ///
    /// - `ZeroAddress` if any member is the null account.
    /// - `AlreadySigner` if a member is listed twice.
    /// - `InvalidThreshold` unless `1 <= threshold <= members`.
    pub fn new(members: &[Address], threshold: u32) -> LedgerResult<Self> {
        let mut set = BTreeSet::new();
        for member in members {
            if member.is_zero() {
                return Err(LedgerError::ZeroAddress);
            }
            if !set.insert(*member) {
                return Err(LedgerError::AlreadySigner(*member));
            }
        }
        check_threshold(threshold, set.len())?;
        Ok(Self {
            members: set,
            threshold,
            _domain: PhantomData,
        })
    }

    /// Domain name, for logs.
    pub fn domain_name(&self) -> &'static str {
        D::NAME
    }

    #[inline]
    pub fn contains(&self, account: &Address) -> bool {
        self.members.contains(account)
    }

    #[inline]
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in ascending address order.
    pub fn members(&self) -> impl Iterator<Item = &Address> {
        self.members.iter()
    }

    /// Whether `confirmations` satisfies the current threshold.
    #[inline]
    pub fn is_met(&self, confirmations: u32) -> bool {
        confirmations >= self.threshold
    }

    pub fn add(&mut self, account: Address) -> LedgerResult<()> {
        if account.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        if self.members.contains(&account) {
            return Err(LedgerError::AlreadySigner(account));
        }
        self.members.insert(account);
        Ok(())
    }

    /// Remove a member. Fails if the remaining set could no longer reach
    /// the threshold.
    pub fn remove(&mut self, account: &Address) -> LedgerResult<()> {
        if !self.members.contains(account) {
            return Err(LedgerError::NotSigner(*account));
        }
        check_threshold(self.threshold, self.members.len() - 1)?;
        self.members.remove(account);
        Ok(())
    }

    pub fn set_threshold(&mut self, threshold: u32) -> LedgerResult<()> {
        check_threshold(threshold, self.members.len())?;
        self.threshold = threshold;
        Ok(())
    }
}

fn check_threshold(threshold: u32, members: usize) -> LedgerResult<()> {
    if threshold == 0 || threshold as usize > members {
        return Err(LedgerError::InvalidThreshold { threshold, members });
    }
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════════
// TESTS
// ════════════════════════════════════════════════════════════════════════════════
