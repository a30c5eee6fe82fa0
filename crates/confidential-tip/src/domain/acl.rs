//! # Access Control Grants
//!
//! Global `(handle, principal)` permission table. Grants are additive and
//! never revoked once committed. The ledger writes it; outside the ledger
//! only the decryption relayer reads it.
//!
//! Grants made during a call are also recorded as pending. The service
//! either commits them (drops the record) or rolls them back (removes the
//! recorded pairs), so a call costs work proportional to its own grants
//! rather than to the size of the table.

use super::value_objects::{Address, Handle};
use crate::ports::outbound::GrantView;
use std::collections::{HashMap, HashSet};

/// Permission table keyed by handle, then principal.
#[derive(Debug, Default)]
pub struct AclTable {
    grants: HashMap<Handle, HashSet<Address>>,
    /// Pairs inserted since the last commit or rollback.
    pending: Vec<(Handle, Address)>,
}

impl AclTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allows `principal` to request decryption of `handle`.
    ///
    /// Returns false if the grant already existed.
    pub fn grant(&mut self, handle: Handle, principal: Address) -> bool {
        let inserted = self.grants.entry(handle).or_default().insert(principal);
        if inserted {
            self.pending.push((handle, principal));
        }
        inserted
    }

    /// Grants `handle` to every principal in `principals`.
    pub fn grant_all(&mut self, handle: Handle, principals: &[Address]) {
        for principal in principals {
            self.grant(handle, *principal);
        }
    }

    /// Makes pending grants permanent.
    pub fn commit(&mut self) {
        self.pending.clear();
    }

    /// Removes every grant made since the last commit or rollback.
    pub fn rollback(&mut self) {
        for (handle, principal) in self.pending.drain(..).rev() {
            if let Some(principals) = self.grants.get_mut(&handle) {
                principals.remove(&principal);
                if principals.is_empty() {
                    self.grants.remove(&handle);
                }
            }
        }
    }

    /// Number of grants awaiting commit or rollback.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Whether `principal` holds a grant on `handle`.
    #[must_use]
    pub fn is_granted(&self, handle: Handle, principal: Address) -> bool {
        self.grants
            .get(&handle)
            .is_some_and(|principals| principals.contains(&principal))
    }

    /// All handles `principal` may decrypt, in no particular order.
    #[must_use]
    pub fn grants_for(&self, principal: Address) -> Vec<Handle> {
        self.grants
            .iter()
            .filter(|(_, principals)| principals.contains(&principal))
            .map(|(handle, _)| *handle)
            .collect()
    }

    /// Total number of `(handle, principal)` pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.grants.values().map(HashSet::len).sum()
    }

    /// True if no grant was ever made.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

impl GrantView for AclTable {
    fn is_granted(&self, handle: Handle, principal: Address) -> bool {
        AclTable::is_granted(self, handle, principal)
    }
}
