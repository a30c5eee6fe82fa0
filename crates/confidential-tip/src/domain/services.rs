//! # Domain Services
//!
//! Stateless helpers: hashing, decimal unit conversion, and the derived
//! encrypted operations built on top of the fixed algebra.

use super::value_objects::Euint64;
use crate::errors::CoprocessorError;
use crate::ports::outbound::FheCoprocessor;
use sha3::{Digest, Keccak256};

/// Computes Keccak-256 hash.
#[must_use]
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

// =============================================================================
// ENCRYPTED HELPERS
// =============================================================================

/// Replaces the uninitialised sentinel with a real encrypted zero.
pub fn or_zero(fhe: &dyn FheCoprocessor, value: Euint64) -> Euint64 {
    if value.is_initialized() {
        value
    } else {
        fhe.trivial_encrypt(0)
    }
}

/// Encrypted `min(a, b)`. Both operands are always evaluated.
pub fn min(fhe: &dyn FheCoprocessor, a: Euint64, b: Euint64) -> Result<Euint64, CoprocessorError> {
    let a_le_b = fhe.le(a, b)?;
    fhe.select(a_le_b, a, b)
}

// =============================================================================
// UNIT CONVERSION
// =============================================================================

/// Errors from [`parse_units`].
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum UnitsError {
    /// Input is not a decimal number.
    #[error("invalid decimal amount: {0:?}")]
    Malformed(String),
    /// More fractional digits than the token supports.
    #[error("too many fractional digits: {digits} > {decimals}")]
    TooPrecise {
        /// Fractional digits supplied.
        digits: usize,
        /// Token decimals.
        decimals: u8,
    },
    /// Amount does not fit in `u64` base units.
    #[error("amount overflows u64 base units")]
    Overflow,
}

/// Parses a display amount such as `"12.5"` into base units.
///
/// # Errors
///
/// Fails on malformed input, excess precision, or overflow.
pub fn parse_units(amount: &str, decimals: u8) -> Result<u64, UnitsError> {
    let trimmed = amount.trim();
    let (whole, frac) = trimmed.split_once('.').unwrap_or((trimmed, ""));

    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !is_digits(whole) || !is_digits(frac) {
        return Err(UnitsError::Malformed(amount.to_string()));
    }
    if frac.len() > usize::from(decimals) {
        return Err(UnitsError::TooPrecise {
            digits: frac.len(),
            decimals,
        });
    }

    let scale = 10u64
        .checked_pow(u32::from(decimals))
        .ok_or(UnitsError::Overflow)?;
    let whole_units = if whole.is_empty() {
        0
    } else {
        whole.parse::<u64>().map_err(|_| UnitsError::Overflow)?
    };
    let frac_units = if frac.is_empty() {
        0
    } else {
        let padded = format!("{frac:0<width$}", width = usize::from(decimals));
        padded.parse::<u64>().map_err(|_| UnitsError::Overflow)?
    };

    whole_units
        .checked_mul(scale)
        .and_then(|v| v.checked_add(frac_units))
        .ok_or(UnitsError::Overflow)
}

/// Formats base units as a display amount, trimming trailing zeros.
///
/// Total for every `decimals`: once `10^decimals` exceeds `u128` every
/// `u64` is a pure fraction.
#[must_use]
pub fn format_units(units: u64, decimals: u8) -> String {
    if decimals == 0 {
        return units.to_string();
    }
    let (whole, frac) = match 10u128.checked_pow(u32::from(decimals)) {
        Some(scale) => (u128::from(units) / scale, u128::from(units) % scale),
        None => (0, u128::from(units)),
    };
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:0>width$}", width = usize::from(decimals));
    format!("{whole}.{}", frac.trim_end_matches('0'))
}
