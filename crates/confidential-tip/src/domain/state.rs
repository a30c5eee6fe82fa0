//! # World State
//!
//! All mutable ledger state, and the per-call context that operations run in.
//!
//! A call runs directly against the live [`WorldState`] after taking a
//! [`Checkpoint`]. The checkpoint copies the per-account tables, whose size
//! is bounded by the number of accounts; the grant table, which grows with
//! every call, is never copied and instead records its pending grants.
//! On failure the caller restores the checkpoint and the grant table drops
//! its pending grants. Events are buffered in the [`CallContext`] and are
//! discarded on failure.

use super::acl::AclTable;
use super::ledger::ConfidentialLedger;
use super::registry::IdentityRegistry;
use super::tips::TipBook;
use super::value_objects::{Address, TokenMetadata};
use crate::events::LedgerEvent;
use crate::ports::outbound::{FheCoprocessor, InputVerifier};

/// Complete mutable state.
#[derive(Debug)]
pub struct WorldState {
    /// Balances, allowances, total supply.
    pub ledger: ConfidentialLedger,
    /// Address to username bijection.
    pub registry: IdentityRegistry,
    /// Encrypted tip counters.
    pub tips: TipBook,
    /// Decryption grants.
    pub acl: AclTable,
}

impl WorldState {
    /// Fresh state with no accounts.
    #[must_use]
    pub fn new(owner: Address, token: TokenMetadata) -> Self {
        Self {
            ledger: ConfidentialLedger::new(owner, token),
            registry: IdentityRegistry::new(),
            tips: TipBook::new(),
            acl: AclTable::new(),
        }
    }

    /// Snapshot to restore if the call about to run fails.
    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            ledger: self.ledger.clone(),
            registry: self.registry.clone(),
            tips: self.tips.clone(),
        }
    }

    /// Keeps every change made since `checkpoint`.
    pub fn commit(&mut self, checkpoint: Checkpoint) {
        drop(checkpoint);
        self.acl.commit();
    }

    /// Undoes every change made since `checkpoint`.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.ledger = checkpoint.ledger;
        self.registry = checkpoint.registry;
        self.tips = checkpoint.tips;
        self.acl.rollback();
    }
}

/// Pre-call copy of the account-indexed tables.
#[derive(Debug)]
pub struct Checkpoint {
    ledger: ConfidentialLedger,
    registry: IdentityRegistry,
    tips: TipBook,
}

/// Environment of one state-changing call.
pub struct CallContext<'a> {
    /// Authenticated caller.
    pub caller: Address,
    /// Address of the ledger itself; receives grants on every stored handle.
    pub contract: Address,
    /// Encrypted algebra.
    pub fhe: &'a dyn FheCoprocessor,
    /// Input-proof verifier.
    pub verifier: &'a dyn InputVerifier,
    events: Vec<LedgerEvent>,
}

impl<'a> CallContext<'a> {
    /// Context for `caller` acting on the ledger at `contract`.
    pub fn new(
        caller: Address,
        contract: Address,
        fhe: &'a dyn FheCoprocessor,
        verifier: &'a dyn InputVerifier,
    ) -> Self {
        Self {
            caller,
            contract,
            fhe,
            verifier,
            events: Vec::new(),
        }
    }

    /// Buffers an event for publication at commit.
    pub fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    /// Events emitted so far.
    #[must_use]
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Consumes the context, yielding buffered events.
    #[must_use]
    pub fn into_events(self) -> Vec<LedgerEvent> {
        self.events
    }
}
