//! # Domain Invariants
//!
//! Properties that hold at every committed state:
//!
//! - Identity bijection: forward and reverse username maps agree
//! - Username bounds: every registered name has 1 to 39 characters
//! - Contract grants: every stored handle is usable by the ledger itself
//! - Holder grants: every balance handle is decryptable by its holder and
//!   by the owner
//!
//! `sum(balances) == total supply` cannot be checked here because it needs
//! plaintext; it is exercised through the decryption relayer in tests.

use super::registry::IdentityRegistry;
use super::state::WorldState;
use super::value_objects::{Address, Handle};

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// Forward and reverse maps are mutual inverses.
#[must_use]
pub fn check_identity_bijection(registry: &IdentityRegistry) -> bool {
    let (forward, reverse) = registry.index_sizes();
    forward == reverse
        && registry
            .identities()
            .all(|(address, name)| registry.wallet_address(name) == address)
}

/// Registered usernames respect the length bounds.
#[must_use]
pub fn check_username_bounds(registry: &IdentityRegistry) -> bool {
    registry.identities().all(|(_, name)| {
        let len = name.chars().count();
        (1..=limits::MAX_USERNAME_LEN).contains(&len)
    })
}

/// Stored handles the contract itself has no grant on.
#[must_use]
pub fn missing_contract_grants(state: &WorldState, contract: Address) -> Vec<Handle> {
    state
        .ledger
        .stored_handles()
        .chain(state.tips.stored_handles())
        .map(|value| value.handle())
        .filter(|handle| !state.acl.is_granted(*handle, contract))
        .collect()
}

/// Balance handles missing a grant for their holder or the owner.
#[must_use]
pub fn missing_holder_grants(state: &WorldState) -> Vec<(Address, Handle)> {
    let owner = state.ledger.owner();
    state
        .ledger
        .balance_entries()
        .filter(|(_, balance)| balance.is_initialized())
        .filter(|(holder, balance)| {
            !state.acl.is_granted(balance.handle(), *holder)
                || !state.acl.is_granted(balance.handle(), owner)
        })
        .map(|(holder, balance)| (holder, balance.handle()))
        .collect()
}

/// Runs every check.
#[must_use]
pub fn check_all_invariants(state: &WorldState, contract: Address) -> InvariantCheckResult {
    let mut violations = Vec::new();

    if !check_identity_bijection(&state.registry) {
        violations.push(InvariantViolation::IdentityNotBijective);
    }

    if !check_username_bounds(&state.registry) {
        violations.push(InvariantViolation::UsernameOutOfBounds);
    }

    let missing = missing_contract_grants(state, contract);
    if !missing.is_empty() {
        violations.push(InvariantViolation::MissingContractGrant {
            handles: missing.len(),
        });
    }

    for (holder, handle) in missing_holder_grants(state) {
        violations.push(InvariantViolation::MissingHolderGrant { holder, handle });
    }

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

// =============================================================================
// INVARIANT TYPES
// =============================================================================

/// Result of checking all invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Username maps disagree.
    IdentityNotBijective,
    /// A registered username is empty or too long.
    UsernameOutOfBounds,
    /// Stored handles the contract cannot operate on.
    MissingContractGrant {
        /// Number of affected handles.
        handles: usize,
    },
    /// Balance handle not decryptable by its holder or the owner.
    MissingHolderGrant {
        /// Account holding the balance.
        holder: Address,
        /// Balance handle.
        handle: Handle,
    },
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IdentityNotBijective => write!(f, "identity maps are not bijective"),
            Self::UsernameOutOfBounds => write!(f, "registered username out of bounds"),
            Self::MissingContractGrant { handles } => {
                write!(f, "{handles} stored handles not granted to the contract")
            }
            Self::MissingHolderGrant { holder, handle } => {
                write!(f, "balance {handle} of {holder} missing holder or owner grant")
            }
        }
    }
}

// =============================================================================
// LIMIT CONSTANTS
// =============================================================================

/// Fixed limits of the ledger's external behaviour.
pub mod limits {
    /// Maximum GitHub username length in characters.
    pub const MAX_USERNAME_LEN: usize = 39;

    /// Maximum number of tips in one batch.
    pub const MAX_BATCH_SIZE: usize = 10;

    /// Decimal places of the token's display unit.
    pub const TOKEN_DECIMALS: u8 = 6;

    /// Longest decryption authorization window accepted by the relayer.
    pub const MAX_DECRYPTION_WINDOW_SECS: u64 = 365 * 24 * 60 * 60; // 365 days
}

// =============================================================================
// TESTS
// =============================================================================
