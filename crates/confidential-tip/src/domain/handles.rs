//! # Handle Provenance
//!
//! Every handle records how it was produced: from verified external input,
//! from trivial encryption of a public constant, or from an algebra
//! operation over earlier handles.

use super::services::keccak256;
use super::value_objects::{Address, FheType, Handle};
use serde::{Deserialize, Serialize};

/// The fixed encrypted algebra.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FheOp {
    /// Wrapping addition of two `u64`.
    Add,
    /// Wrapping subtraction of two `u64`.
    Sub,
    /// `lhs <= rhs`, yields a boolean.
    Le,
    /// Boolean conjunction.
    And,
    /// `cond ? if_true : if_false`.
    Select,
}

impl FheOp {
    /// Domain-separation tag mixed into derived handles.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Add => 0x01,
            Self::Sub => 0x02,
            Self::Le => 0x03,
            Self::And => 0x04,
            Self::Select => 0x05,
        }
    }

    /// Result type of the operation.
    #[must_use]
    pub const fn output_type(self) -> FheType {
        match self {
            Self::Add | Self::Sub | Self::Select => FheType::Uint64,
            Self::Le | Self::And => FheType::Bool,
        }
    }
}

/// Where a handle came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandleOrigin {
    /// Encrypted by a user for a given contract.
    Input {
        /// Contract the ciphertext is bound to.
        contract: Address,
        /// User who produced it.
        user: Address,
    },
    /// Trivial encryption of a public constant.
    Trivial,
    /// Output of an algebra operation.
    Computed {
        /// Operation applied.
        op: FheOp,
        /// Operand handles in argument order.
        operands: Vec<Handle>,
    },
}

/// Metadata the coprocessor keeps for every issued handle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleRecord {
    /// Plaintext type.
    pub fhe_type: FheType,
    /// Provenance.
    pub origin: HandleOrigin,
}

const TAG_INPUT: u8 = 0xf0;
const TAG_TRIVIAL: u8 = 0xf1;

/// Derives a fresh handle.
///
/// The first 31 bytes are `keccak256(tag || operands || extra || nonce)`, the
/// last byte is the type. Including the nonce makes two identical
/// computations yield distinct handles.
#[must_use]
pub fn derive_handle(tag: u8, operands: &[Handle], extra: &[u8], nonce: u64, fhe_type: FheType) -> Handle {
    let mut preimage = Vec::with_capacity(1 + operands.len() * 32 + extra.len() + 8);
    preimage.push(tag);
    for operand in operands {
        preimage.extend_from_slice(operand.as_bytes());
    }
    preimage.extend_from_slice(extra);
    preimage.extend_from_slice(&nonce.to_be_bytes());

    let mut bytes = keccak256(&preimage);
    bytes[31] = fhe_type as u8;
    Handle::new(bytes)
}

/// Handle for an algebra result.
#[must_use]
pub fn derive_computed(op: FheOp, operands: &[Handle], nonce: u64) -> Handle {
    derive_handle(op.tag(), operands, &[], nonce, op.output_type())
}

/// Handle for a trivially encrypted constant.
#[must_use]
pub fn derive_trivial(fhe_type: FheType, nonce: u64) -> Handle {
    derive_handle(TAG_TRIVIAL, &[], &[], nonce, fhe_type)
}

/// Handle for a user input bound to `(contract, user)`.
#[must_use]
pub fn derive_input(contract: Address, user: Address, nonce: u64) -> Handle {
    let mut extra = [0u8; 40];
    extra[..20].copy_from_slice(contract.as_bytes());
    extra[20..].copy_from_slice(user.as_bytes());
    derive_handle(TAG_INPUT, &[], &extra, nonce, FheType::Uint64)
}
