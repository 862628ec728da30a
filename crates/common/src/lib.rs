//! # Physical Node Ledger: Common Crate
//!
//! Side-effect-free building blocks shared by the ledger state machine.
//!
//! ## Modules
//! - `types`: `Address`, the 20-byte account identifier
//! - `error`: `LedgerError`, the error contract of every ledger operation
//! - `node_type`: node tiers, capacity units and reward weights
//! - `signer_set`: generic M-of-N `SignerSet<D>` for the operations and withdrawal domains
//! - `cooldown`: per-user reward cooldown window
//! - `config`: TOML configuration (`LedgerConfig`)

pub mod types;
pub mod error;
pub mod node_type;
pub mod signer_set;
pub mod cooldown;
pub mod config;

pub use types::Address;
pub use error::{LedgerError, LedgerResult};
pub use node_type::NodeType;
pub use signer_set::{AuthorityDomain, Operations, SignerDomain, SignerSet, Withdrawal};
pub use cooldown::{RewardCooldown, DEFAULT_REWARD_COOLDOWN_SECS};
pub use config::{ConfigError, LedgerConfig};
