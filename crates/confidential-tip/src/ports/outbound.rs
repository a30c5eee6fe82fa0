//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the ledger depends on:
//! - the encrypted-algebra backend (coprocessor)
//! - the input-proof verifier
//! - the event sink
//!
//! and the read-only grant view handed to the decryption relayer.

use crate::domain::handles::HandleRecord;
use crate::domain::value_objects::{Address, Ebool, Euint64, ExternalEuint64, Handle, InputProof};
use crate::errors::{CoprocessorError, LedgerError};
use crate::events::LedgerEvent;
use async_trait::async_trait;

// =============================================================================
// ENCRYPTED ALGEBRA
// =============================================================================

/// The fixed homomorphic algebra.
///
/// Implementations never reveal plaintext through this trait. Every operation
/// issues a fresh handle; operands are never mutated. Operands equal to the
/// uninitialised sentinel are rejected as unknown, callers normalise them
/// with [`or_zero`](crate::domain::services::or_zero) first.
pub trait FheCoprocessor: Send + Sync {
    /// Encrypts a public constant.
    fn trivial_encrypt(&self, value: u64) -> Euint64;

    /// Wrapping `lhs + rhs`.
    ///
    /// # Errors
    ///
    /// Unknown or mistyped operand.
    fn add(&self, lhs: Euint64, rhs: Euint64) -> Result<Euint64, CoprocessorError>;

    /// Wrapping `lhs - rhs`.
    ///
    /// # Errors
    ///
    /// Unknown or mistyped operand.
    fn sub(&self, lhs: Euint64, rhs: Euint64) -> Result<Euint64, CoprocessorError>;

    /// Encrypted `lhs <= rhs`.
    ///
    /// # Errors
    ///
    /// Unknown or mistyped operand.
    fn le(&self, lhs: Euint64, rhs: Euint64) -> Result<Ebool, CoprocessorError>;

    /// Encrypted `lhs && rhs`.
    ///
    /// # Errors
    ///
    /// Unknown or mistyped operand.
    fn and(&self, lhs: Ebool, rhs: Ebool) -> Result<Ebool, CoprocessorError>;

    /// Encrypted `cond ? if_true : if_false`, both branches already computed.
    ///
    /// # Errors
    ///
    /// Unknown or mistyped operand.
    fn select(&self, cond: Ebool, if_true: Euint64, if_false: Euint64)
        -> Result<Euint64, CoprocessorError>;

    /// Provenance of a handle, `None` if never issued.
    fn metadata(&self, handle: Handle) -> Option<HandleRecord>;
}

// =============================================================================
// INPUT VERIFICATION
// =============================================================================

/// Verifies externally supplied ciphertexts.
pub trait InputVerifier: Send + Sync {
    /// Checks that `proof` binds `input` to `(contract, user)`.
    ///
    /// The proof is consumed whether or not it verifies.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidProof`] if the proof does not verify.
    fn verify_input(
        &self,
        input: ExternalEuint64,
        proof: InputProof,
        contract: Address,
        user: Address,
    ) -> Result<Euint64, LedgerError>;
}

// =============================================================================
// EVENTS
// =============================================================================

/// Sink for committed ledger events.
///
/// Called only after a call commits, in emission order.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish one event.
    async fn publish(&self, event: LedgerEvent);
}

// =============================================================================
// GRANT VIEW
// =============================================================================

/// Read-only access to decryption grants.
///
/// Consulted by the off-chain decryption relayer, never by ledger logic.
pub trait GrantView {
    /// Whether `principal` may request decryption of `handle`.
    fn is_granted(&self, handle: Handle, principal: Address) -> bool;
}
