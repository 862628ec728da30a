//! # Access Policy
//!
//! Every public operation resolves the caller's role here before touching
//! any state. Each `require_*` returns the `Role` that satisfied the check
//! so the operation can carry it (events, logs) instead of re-deriving it.
//!
//! | Check | Accepts |
//! |-------|---------|
//! | `require_admin` | administrator |
//! | `require_admin_or_whitelisted` | administrator, whitelisted account |
//! | `require_op_signer` | operations signer |
//! | `require_op_signer_or_admin` | operations signer, administrator |
//! | `require_withdraw_signer` | withdrawal signer |
//!
//! Operations and withdrawal authority never substitute for each other,
//! even for an account that sits in both sets.

use pnode_common::{Address, LedgerError, LedgerResult};
use tracing::warn;

use super::{LedgerState, Role};

impl LedgerState {
    pub fn require_admin(&self, caller: &Address) -> LedgerResult<Role> {
        if *caller == self.admin {
            return Ok(Role::Administrator);
        }
        Err(self.deny(caller, "administrator"))
    }

    pub fn require_admin_or_whitelisted(&self, caller: &Address) -> LedgerResult<Role> {
        if *caller == self.admin {
            return Ok(Role::Administrator);
        }
        if self.is_whitelisted(caller) {
            return Ok(Role::Whitelisted);
        }
        Err(self.deny(caller, "administrator or whitelisted"))
    }

    pub fn require_op_signer(&self, caller: &Address) -> LedgerResult<Role> {
        if self.op_signers.contains(caller) {
            return Ok(Role::OperationsSigner);
        }
        Err(self.deny(caller, "operations signer"))
    }

    pub fn require_op_signer_or_admin(&self, caller: &Address) -> LedgerResult<Role> {
        if self.op_signers.contains(caller) {
            return Ok(Role::OperationsSigner);
        }
        if *caller == self.admin {
            return Ok(Role::Administrator);
        }
        Err(self.deny(caller, "operations signer or administrator"))
    }

    pub fn require_withdraw_signer(&self, caller: &Address) -> LedgerResult<Role> {
        if self.withdraw_signers.contains(caller) {
            return Ok(Role::WithdrawalSigner);
        }
        Err(self.deny(caller, "withdrawal signer"))
    }

    fn deny(&self, caller: &Address, needed: &'static str) -> LedgerError {
        warn!(caller = %caller, needed, "unauthorized call rejected");
        LedgerError::Unauthorized { caller: *caller }
    }
}
