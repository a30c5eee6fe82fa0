//! # Confidential Tip - Encrypted Ledger with GitHub Tipping
//!
//! ## Purpose
//!
//! A fungible-token ledger whose balances, allowances and total supply are
//! ciphertext handles. Amounts never appear in plaintext on the ledger:
//! arithmetic is delegated to an FHE coprocessor and values are revealed
//! only through signed user-decryption requests. On top of the ledger sits
//! a one-to-one mapping between addresses and GitHub usernames, and a
//! tipping layer that routes encrypted transfers by username.
//!
//! ## Domain Rules
//!
//! | Rule | Enforcement Location |
//! |------|---------------------|
//! | Overdraft clamps, never reverts | `domain/ledger.rs` - `ConfidentialLedger::transfer()` |
//! | Delegated spend bounded by allowance and balance | `domain/ledger.rs` - `transfer_from()` |
//! | Address/username bijection | `domain/registry.rs` - `IdentityRegistry::register()` |
//! | Username length 1..=39 characters | `domain/registry.rs` - `validate_username()` |
//! | Batch of at most 10 tips, all or nothing | `domain/batch.rs`, `service.rs` - `execute()` |
//! | Every stored handle granted to the ledger | `domain/invariants.rs` - `missing_contract_grants()` |
//!
//! ## Access Control
//!
//! | Operation | Allowed Caller |
//! |-----------|----------------|
//! | `mint`, `get_total_supply` | Owner |
//! | `get_balance_of` | Account holder or owner |
//! | `send_tip`, `batch_send_tips`, tip totals | Registered address |
//! | Everything else | Anyone |
//!
//! ## Outbound Dependencies
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | `FheCoprocessor` | Encrypted arithmetic and comparison |
//! | `InputVerifier` | Bind user-encrypted inputs to caller and ledger |
//! | `EventPublisher` | Deliver committed events |
//!
//! ## Usage Example
//!
//! ```ignore
//! use confidential_tip::prelude::*;
//!
//! let service = create_test_service();
//! let owner = service.config().owner;
//! service.mint(owner, alice, 1_000_000).await?;
//!
//! service.register_github_user(bob, "bob").await?;
//! let (amount, proof) = service
//!     .coprocessor()
//!     .encrypt_input(100_000, service.config().contract, alice);
//! service.send_tip(alice, "bob", amount, proof).await?;
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Value objects
    pub use crate::domain::value_objects::{
        Address, Ebool, Euint64, ExternalEuint64, FheType, Handle, InputProof, TokenMetadata,
    };

    // Domain
    pub use crate::domain::{
        AclTable, CallContext, ConfidentialLedger, IdentityRegistry, TipBook, TipStat, WorldState,
    };

    // Domain services
    pub use crate::domain::services::{format_units, keccak256, parse_units, UnitsError};

    // Invariants
    pub use crate::domain::invariants::{
        check_all_invariants, limits, InvariantCheckResult, InvariantViolation,
    };

    // Ports
    pub use crate::ports::inbound::{ConfidentialTokenApi, IdentityApi, TipApi};
    pub use crate::ports::outbound::{EventPublisher, FheCoprocessor, GrantView, InputVerifier};

    // Events
    pub use crate::events::{topics, LedgerEvent};

    // Errors
    pub use crate::errors::{
        ArgumentError, ConfigError, CoprocessorError, DecryptionError, LedgerError,
    };

    // Adapters
    pub use crate::adapters::{
        address_of, sign_authorization, unix_now, DecryptionAuthorization, DecryptionRelayer,
        InMemoryCoprocessor, InMemoryEventLog, Plaintext, SignedAuthorization,
    };

    // Service
    pub use crate::service::{create_test_service, ServiceConfig, ServiceStats, TipService};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Service name used in logs and metrics.
pub const SERVICE_NAME: &str = "Confidential Tip";
