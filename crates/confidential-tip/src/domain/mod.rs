//! # Domain Layer (Inner Hexagon)
//!
//! Pure ledger logic. No I/O, no async; all encrypted computation goes
//! through the [`FheCoprocessor`](crate::ports::outbound::FheCoprocessor) port.
//!
//! - `value_objects`: Address, Handle, typed ciphertexts
//! - `handles`: handle provenance and derivation
//! - `acl`: decryption grant table
//! - `ledger`: balances, allowances, supply
//! - `registry`: address/username bijection
//! - `tips`: username-routed transfers and tip counters
//! - `batch`: bounded sequential tipping
//! - `state`: world state and call context
//! - `invariants`: runtime checks and limits

pub mod acl;
pub mod batch;
pub mod handles;
pub mod invariants;
pub mod ledger;
pub mod registry;
pub mod services;
pub mod state;
pub mod tips;
pub mod value_objects;

pub use acl::AclTable;
pub use handles::{FheOp, HandleOrigin, HandleRecord};
pub use invariants::{check_all_invariants, limits, InvariantCheckResult, InvariantViolation};
pub use ledger::ConfidentialLedger;
pub use registry::IdentityRegistry;
pub use state::{CallContext, Checkpoint, WorldState};
pub use tips::{TipBook, TipStat};
pub use value_objects::*;
