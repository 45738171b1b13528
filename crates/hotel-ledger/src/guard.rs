//! The access control guard: who may run owner-restricted operations.

use hotel_protocol::Principal;

use crate::LedgerError;

/// Holds the single identity with owner rights.
///
/// The ledger calls [`require_owner`](Self::require_owner) first thing in
/// every owner-restricted operation, before it looks at any other argument,
/// so a refused call can never have touched ledger state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerGuard {
    owner: Principal,
}

impl OwnerGuard {
    /// Creates a guard with `owner` holding owner rights.
    pub fn new(owner: Principal) -> Self {
        Self { owner }
    }

    /// The current owner.
    pub fn owner(&self) -> Principal {
        self.owner
    }

    /// Fails with [`LedgerError::Unauthorized`] unless `caller` is the
    /// owner.
    pub fn require_owner(&self, caller: Principal) -> Result<(), LedgerError> {
        if caller == self.owner {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized { caller })
        }
    }

    /// Hands owner rights to `new_owner`. Returns the previous owner.
    ///
    /// Callers must have passed [`require_owner`](Self::require_owner).
    pub(crate) fn transfer(&mut self, new_owner: Principal) -> Principal {
        std::mem::replace(&mut self.owner, new_owner)
    }
}
