//! # Value Objects
//!
//! Immutable domain primitives for the confidential ledger.
//! Encrypted values are opaque handles: nothing in this module converts a
//! handle into a plaintext integer.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// ADDRESS (20 bytes)
// =============================================================================

/// A 20-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address (0x0000...0000). Returned by lookups that find nothing.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Creates an address from a 20-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Creates an address from a slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        <[u8; 20]>::try_from(slice).ok().map(Self)
    }

    /// Parses a hex string, with or without `0x` prefix.
    #[must_use]
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        hex::decode(s).ok().and_then(|bytes| Self::from_slice(&bytes))
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns true if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Full `0x`-prefixed lowercase hex form.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{}...{}",
            hex::encode(&self.0[..4]),
            hex::encode(&self.0[18..])
        )
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

// =============================================================================
// FHE TYPE
// =============================================================================

/// Plaintext type carried by a ciphertext handle.
///
/// The discriminant is stored in the last byte of every handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FheType {
    /// Encrypted boolean.
    Bool = 0,
    /// Encrypted unsigned 64-bit integer.
    Uint64 = 5,
}

impl FheType {
    /// Decodes the type byte of a handle.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Bool),
            5 => Some(Self::Uint64),
            _ => None,
        }
    }
}

// =============================================================================
// HANDLE (32 bytes)
// =============================================================================

/// Opaque 32-byte reference to a ciphertext held by the coprocessor.
///
/// The all-zero handle means "never written"; it behaves as an encrypted zero.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Handle(pub [u8; 32]);

impl Handle {
    /// The uninitialised sentinel.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Creates a handle from a 32-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns true for the uninitialised sentinel.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Type embedded in the handle, if the type byte is recognised.
    #[must_use]
    pub const fn fhe_type(&self) -> Option<FheType> {
        FheType::from_byte(self.0[31])
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}..{}", hex::encode(&self.0[..6]), hex::encode(&self.0[30..]))
    }
}

// =============================================================================
// TYPED CIPHERTEXTS
// =============================================================================

/// Encrypted `u64`. Only the coprocessor algebra can derive new values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Euint64(Handle);

impl Euint64 {
    /// Uninitialised value; treated as an encrypted zero.
    pub const UNINITIALIZED: Self = Self(Handle::ZERO);

    /// Wraps a handle issued by a coprocessor.
    #[must_use]
    pub const fn from_raw(handle: Handle) -> Self {
        Self(handle)
    }

    /// The underlying handle.
    #[must_use]
    pub const fn handle(&self) -> Handle {
        self.0
    }

    /// Whether this value was ever written.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        !self.0.is_zero()
    }
}

/// Encrypted boolean produced by comparisons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ebool(Handle);

impl Ebool {
    /// Wraps a handle issued by a coprocessor.
    #[must_use]
    pub const fn from_raw(handle: Handle) -> Self {
        Self(handle)
    }

    /// The underlying handle.
    #[must_use]
    pub const fn handle(&self) -> Handle {
        self.0
    }
}

/// Externally supplied `u64` ciphertext, not yet verified.
///
/// Must go through an [`InputVerifier`](crate::ports::outbound::InputVerifier)
/// before it can be used as an [`Euint64`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalEuint64(Handle);

impl ExternalEuint64 {
    /// Wraps a handle produced by the encryption service.
    #[must_use]
    pub const fn from_raw(handle: Handle) -> Self {
        Self(handle)
    }

    /// The underlying handle.
    #[must_use]
    pub const fn handle(&self) -> Handle {
        self.0
    }
}

/// Validity proof accompanying an [`ExternalEuint64`]. Consumed by verification.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputProof(Vec<u8>);

impl InputProof {
    /// Wraps raw proof bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Raw proof bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for InputProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InputProof({} bytes)", self.0.len())
    }
}

// =============================================================================
// TOKEN METADATA
// =============================================================================

/// Public token descriptors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Human-readable name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Number of fractional decimal digits in a display amount.
    pub decimals: u8,
}

impl Default for TokenMetadata {
    fn default() -> Self {
        Self {
            name: "Confidential USDT".to_string(),
            symbol: "CUSDT".to_string(),
            decimals: crate::domain::invariants::limits::TOKEN_DECIMALS,
        }
    }
}
