//! # Error Types
//!
//! Every ledger call either commits fully or fails with one of these errors
//! and leaves no trace in state.

use crate::domain::value_objects::{Address, FheType, Handle};
use thiserror::Error;

// =============================================================================
// LEDGER ERRORS
// =============================================================================

/// Failure of a ledger, registry or tip call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Caller already has a GitHub username.
    #[error("address {0} is already registered")]
    AlreadyRegistered(Address),

    /// Username is claimed by another address.
    #[error("GitHub username already taken: {0}")]
    GitHubUsernameTaken(String),

    /// Caller has no GitHub username.
    #[error("caller {0} is not registered")]
    NotRegistered(Address),

    /// Recipient username is not registered.
    #[error("GitHub user not found: {0}")]
    UserNotFound(String),

    /// Caller may not perform this operation.
    #[error("{caller} is not authorized to {operation}")]
    Unauthorized {
        /// Offending caller.
        caller: Address,
        /// Operation that was refused.
        operation: &'static str,
    },

    /// Malformed argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ArgumentError),

    /// Ciphertext input proof did not verify.
    #[error("invalid input proof for handle {0}")]
    InvalidProof(Handle),

    /// The encrypted-algebra backend refused an operation.
    #[error("coprocessor error: {0}")]
    Coprocessor(#[from] CoprocessorError),
}

impl LedgerError {
    /// Short, stable label used for metrics and logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AlreadyRegistered(_) => "already_registered",
            Self::GitHubUsernameTaken(_) => "username_taken",
            Self::NotRegistered(_) => "not_registered",
            Self::UserNotFound(_) => "user_not_found",
            Self::Unauthorized { .. } => "unauthorized",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::InvalidProof(_) => "invalid_proof",
            Self::Coprocessor(_) => "coprocessor",
        }
    }

    /// True for failures caused by who the caller is.
    #[must_use]
    pub const fn is_authorization_failure(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::NotRegistered(_))
    }

    /// True for failures caused by what the caller sent.
    #[must_use]
    pub const fn is_input_failure(&self) -> bool {
        matches!(self, Self::InvalidArgument(_) | Self::InvalidProof(_))
    }
}

/// Details of an [`LedgerError::InvalidArgument`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// Username is the empty string.
    #[error("GitHub username cannot be empty")]
    EmptyUsername,

    /// Username exceeds the character limit.
    #[error("GitHub username too long: {len} > {max} characters")]
    UsernameTooLong {
        /// Supplied length in characters.
        len: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// Batch input sequences differ in length.
    #[error("array lengths mismatch: {usernames} usernames, {amounts} amounts, {proofs} proofs")]
    ArrayLengthMismatch {
        /// Number of usernames.
        usernames: usize,
        /// Number of encrypted amounts.
        amounts: usize,
        /// Number of proofs.
        proofs: usize,
    },

    /// Batch has too many entries.
    #[error("too many tips at once: {len} > {max}")]
    BatchTooLarge {
        /// Supplied batch length.
        len: usize,
        /// Maximum allowed.
        max: usize,
    },
}

// =============================================================================
// COPROCESSOR ERRORS
// =============================================================================

/// Errors raised by an encrypted-algebra backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoprocessorError {
    /// Handle was never issued by this coprocessor.
    #[error("unknown ciphertext handle {0}")]
    UnknownHandle(Handle),

    /// Operand has the wrong plaintext type.
    #[error("type mismatch for {handle}: expected {expected:?}")]
    TypeMismatch {
        /// Offending handle.
        handle: Handle,
        /// Type the operation requires.
        expected: FheType,
    },
}

// =============================================================================
// DECRYPTION ERRORS
// =============================================================================

/// Reasons the decryption relayer refuses a user-decryption request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecryptionError {
    /// No handles were requested.
    #[error("decryption request contains no handles")]
    EmptyRequest,

    /// Authorization is scoped to a different contract.
    #[error("authorization is for contract {requested}, relayer serves {served}")]
    ContractMismatch {
        /// Contract named in the authorization.
        requested: Address,
        /// Contract the relayer decrypts for.
        served: Address,
    },

    /// Validity window has not started.
    #[error("authorization not valid until {start} (now {now})")]
    NotYetValid {
        /// Window start, unix seconds.
        start: u64,
        /// Current time, unix seconds.
        now: u64,
    },

    /// Validity window has elapsed.
    #[error("authorization expired at {expired_at} (now {now})")]
    Expired {
        /// Window end, unix seconds.
        expired_at: u64,
        /// Current time, unix seconds.
        now: u64,
    },

    /// Requested window exceeds the maximum.
    #[error("authorization window too long: {secs}s > {max}s")]
    DurationTooLong {
        /// Requested duration.
        secs: u64,
        /// Maximum allowed.
        max: u64,
    },

    /// Signature is malformed or cannot be recovered.
    #[error("invalid authorization signature")]
    InvalidSignature,

    /// Signature recovers to someone other than the requester.
    #[error("authorization signed by {recovered}, expected {requester}")]
    SignerMismatch {
        /// Address recovered from the signature.
        recovered: Address,
        /// Address named as requester.
        requester: Address,
    },

    /// Requester or contract lacks a grant on the handle.
    #[error("{principal} is not granted on handle {handle}")]
    NotGranted {
        /// Handle that was refused.
        handle: Handle,
        /// Principal missing the grant.
        principal: Address,
    },

    /// Backend has no plaintext for the handle.
    #[error("coprocessor error: {0}")]
    Coprocessor(#[from] CoprocessorError),
}

// =============================================================================
// CONFIGURATION ERRORS
// =============================================================================

/// Invalid service configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Environment variable does not hold a 20-byte hex address.
    #[error("{var} is not a valid address: {value:?}")]
    InvalidAddress {
        /// Variable name.
        var: &'static str,
        /// Offending value.
        value: String,
    },

    /// Owner and contract must be distinct principals.
    #[error("owner and contract address must differ")]
    OwnerIsContract,
}
