//! # Ledger Error Types
//!
//! `LedgerError` is the public error contract for every operation of the
//! physical node ledger. Errors are local, synchronous and never retried
//! by the ledger itself; the caller corrects the triggering condition and
//! resubmits.
//!
//! ## Overview
//!
//! | Category | Variants |
//! |----------|----------|
//! | Access | `Unauthorized` |
//! | Registry | `InvalidNodeType`, `DuplicateNodeId`, `NodeValueTooLow`, `CapacityExceeded`, `NodeNotFound` |
//! | Rewards | `Paused`, `InvalidYear`, `AlreadyRewardedOrCooldown`, `NoEligibleUsers` |
//! | Treasury | `ZeroAddress`, `AlreadyConfirmed`, `NotEnoughConfirmations`, `AlreadyExecuted`, `InsufficientTreasuryBalance`, `ProposalNotFound`, `InvalidAmount` |
//! | Signer sets | `InvalidThreshold`, `AlreadySigner`, `NotSigner` |
//! | Tokens | `TokenNotConfigured`, `UnknownToken`, `TransferFailed` |
//! | Arithmetic | `ArithmeticOverflow` |
//!
//! ## Safety Properties
//!
//! - `LedgerError` is a value type: `Clone`, `Debug`, `PartialEq`, `Eq`.
//! - Display messages are deterministic and contain no debug formatting.
//! - Every variant aborts the whole triggering operation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Address;

// ════════════════════════════════════════════════════════════════════════════════
// LEDGER ERROR
// ════════════════════════════════════════════════════════════════════════════════

/// Every failure the ledger can report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerError {
    /// The caller holds none of the roles accepted at this call site.
    Unauthorized {
        /// The rejected caller.
        caller: Address,
    },

    /// Node type outside `1..=4`.
    InvalidNodeType(u8),

    /// A node with this id is already registered.
    DuplicateNodeId(u64),

    /// Commodity (tier 4) node below the minimum monetary value.
    NodeValueTooLow {
        /// Minimum monetary value in base units.
        required: u128,
        /// Value carried by the rejected node.
        actual: u128,
    },

    /// Registering the node would exceed the global capacity ceiling.
    CapacityExceeded {
        /// Configured ceiling in capacity units.
        max_units: u64,
        /// Units consumed if the node were accepted.
        requested_units: u64,
    },

    /// No administrative node at this index.
    NodeNotFound(u64),

    /// Reward operations are paused.
    Paused,

    /// Reward year outside the accepted range.
    InvalidYear(u32),

    /// The user was already rewarded for this year or within the cooldown window.
    AlreadyRewardedOrCooldown {
        /// The rejected user.
        user: Address,
        /// The requested reward year.
        year: u32,
    },

    /// Every user of a reward batch was ineligible.
    NoEligibleUsers {
        /// Number of users rejected.
        rejected: usize,
    },

    /// A required account is the null account.
    ZeroAddress,

    /// The signer has already confirmed this proposal.
    AlreadyConfirmed {
        /// Proposal id.
        proposal_id: u64,
        /// The repeat signer.
        signer: Address,
    },

    /// Confirmations are below the current withdrawal threshold.
    NotEnoughConfirmations {
        /// Current threshold.
        required: u32,
        /// Confirmations recorded so far.
        actual: u32,
    },

    /// The proposal has already been executed.
    AlreadyExecuted(u64),

    /// The treasury holds less of the token than the payout requires.
    InsufficientTreasuryBalance {
        /// Token being paid out.
        token: Address,
        /// Amount required.
        required: u128,
        /// Treasury balance at the time of the check.
        available: u128,
    },

    /// No withdrawal proposal with this id.
    ProposalNotFound(u64),

    /// Amount must be strictly positive.
    InvalidAmount,

    /// Threshold outside `1..=members`.
    InvalidThreshold {
        /// Rejected threshold.
        threshold: u32,
        /// Member count the threshold was checked against.
        members: usize,
    },

    /// The account is already a member of the signer set.
    AlreadySigner(Address),

    /// The account is not a member of the signer set.
    NotSigner(Address),

    /// No reward token has been configured yet.
    TokenNotConfigured,

    /// The token is not known to the ledger's token book.
    UnknownToken(Address),

    /// The token collaborator reported failure or returned `false`.
    TransferFailed {
        /// Token whose transfer failed.
        token: Address,
        /// Collaborator-supplied reason.
        reason: String,
    },

    /// A counter or amount would overflow.
    ArithmeticOverflow,
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::Unauthorized { caller } => {
                write!(f, "caller {} is not authorized for this operation", caller)
            }
            LedgerError::InvalidNodeType(t) => write!(f, "invalid node type: {}", t),
            LedgerError::DuplicateNodeId(id) => write!(f, "node id {} already exists", id),
            LedgerError::NodeValueTooLow { required, actual } => {
                write!(
                    f,
                    "commodity node value too low: required {}, actual {}",
                    required, actual
                )
            }
            LedgerError::CapacityExceeded {
                max_units,
                requested_units,
            } => {
                write!(
                    f,
                    "node capacity exceeded: requested {} of {} units",
                    requested_units, max_units
                )
            }
            LedgerError::NodeNotFound(index) => write!(f, "node {} not found", index),
            LedgerError::Paused => write!(f, "reward distribution is paused"),
            LedgerError::InvalidYear(year) => write!(f, "invalid reward year: {}", year),
            LedgerError::AlreadyRewardedOrCooldown { user, year } => {
                write!(
                    f,
                    "user {} already rewarded for year {} or within cooldown",
                    user, year
                )
            }
            LedgerError::NoEligibleUsers { rejected } => {
                write!(f, "no eligible users in batch ({} rejected)", rejected)
            }
            LedgerError::ZeroAddress => write!(f, "zero address not allowed"),
            LedgerError::AlreadyConfirmed {
                proposal_id,
                signer,
            } => {
                write!(
                    f,
                    "signer {} already confirmed proposal {}",
                    signer, proposal_id
                )
            }
            LedgerError::NotEnoughConfirmations { required, actual } => {
                write!(
                    f,
                    "not enough confirmations: required {}, actual {}",
                    required, actual
                )
            }
            LedgerError::AlreadyExecuted(id) => write!(f, "proposal {} already executed", id),
            LedgerError::InsufficientTreasuryBalance {
                token,
                required,
                available,
            } => {
                write!(
                    f,
                    "insufficient treasury balance of token {}: required {}, available {}",
                    token, required, available
                )
            }
            LedgerError::ProposalNotFound(id) => write!(f, "proposal {} not found", id),
            LedgerError::InvalidAmount => write!(f, "amount must be greater than zero"),
            LedgerError::InvalidThreshold { threshold, members } => {
                write!(
                    f,
                    "invalid threshold {} for {} signers",
                    threshold, members
                )
            }
            LedgerError::AlreadySigner(a) => write!(f, "{} is already a signer", a),
            LedgerError::NotSigner(a) => write!(f, "{} is not a signer", a),
            LedgerError::TokenNotConfigured => write!(f, "reward token not configured"),
            LedgerError::UnknownToken(t) => write!(f, "unknown token {}", t),
            LedgerError::TransferFailed { token, reason } => {
                write!(f, "transfer of token {} failed: {}", token, reason)
            }
            LedgerError::ArithmeticOverflow => write!(f, "arithmetic overflow"),
        }
    }
}

impl std::error::Error for LedgerError {}

/// Result alias used across the ledger.
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

// ════════════════════════════════════════════════════════════════════════════════
// TESTS
// ════════════════════════════════════════════════════════════════════════════════
