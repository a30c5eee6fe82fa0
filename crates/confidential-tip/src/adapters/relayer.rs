//! # Decryption Relayer
//!
//! Reference implementation of the off-chain user-decryption service.
//!
//! A user who wants plaintext signs a [`DecryptionAuthorization`] naming the
//! handles, themselves, the ledger contract and a validity window. The
//! relayer releases plaintext only if:
//!
//! 1. the signature recovers to the named requester
//! 2. `start <= now < start + duration`
//! 3. every requested handle is granted to both the requester and the contract
//!
//! The ledger never calls this module.

use super::coprocessor::{InMemoryCoprocessor, Plaintext};
use crate::domain::invariants::limits::MAX_DECRYPTION_WINDOW_SECS;
use crate::domain::services::keccak256;
use crate::domain::value_objects::{Address, Handle};
use crate::errors::{CoprocessorError, DecryptionError};
use crate::ports::outbound::GrantView;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Domain separator mixed into every authorization digest.
const AUTHORIZATION_DOMAIN: &[u8] = b"confidential-tip/user-decrypt/v1";

/// Permission a user grants the relayer to reveal handles to them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptionAuthorization {
    /// Handles to decrypt, in the order results are returned.
    pub handles: Vec<Handle>,
    /// Address that will receive the plaintext.
    pub requester: Address,
    /// Ledger the handles belong to.
    pub contract: Address,
    /// Window start, unix seconds.
    pub start_timestamp: u64,
    /// Window length in seconds.
    pub duration_secs: u64,
}

impl DecryptionAuthorization {
    /// First second at which the authorization is no longer valid.
    #[must_use]
    pub fn expires_at(&self) -> u64 {
        self.start_timestamp.saturating_add(self.duration_secs)
    }

    /// Keccak-256 digest the requester signs.
    #[must_use]
    pub fn digest(&self) -> [u8; 32] {
        let mut preimage =
            Vec::with_capacity(AUTHORIZATION_DOMAIN.len() + 56 + self.handles.len() * 32);
        preimage.extend_from_slice(AUTHORIZATION_DOMAIN);
        preimage.extend_from_slice(self.contract.as_bytes());
        preimage.extend_from_slice(self.requester.as_bytes());
        preimage.extend_from_slice(&self.start_timestamp.to_be_bytes());
        preimage.extend_from_slice(&self.duration_secs.to_be_bytes());
        for handle in &self.handles {
            preimage.extend_from_slice(handle.as_bytes());
        }
        keccak256(&preimage)
    }
}

/// Authorization plus a 65-byte `r || s || v` signature (`v` is 27 or 28).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedAuthorization {
    /// The signed authorization.
    pub authorization: DecryptionAuthorization,
    /// ECDSA signature, `r || s || v`.
    pub signature: Vec<u8>,
}

/// Address controlled by a secp256k1 key: last 20 bytes of
/// `keccak256(uncompressed_pubkey[1..])`.
#[must_use]
pub fn address_of(key: &VerifyingKey) -> Address {
    let encoded = key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash[12..]);
    Address::new(bytes)
}

/// Signs an authorization on the user's side.
///
/// # Errors
///
/// [`DecryptionError::InvalidSignature`] if signing fails.
pub fn sign_authorization(
    authorization: DecryptionAuthorization,
    key: &SigningKey,
) -> Result<SignedAuthorization, DecryptionError> {
    let (signature, recovery_id) = key
        .sign_prehash_recoverable(&authorization.digest())
        .map_err(|_| DecryptionError::InvalidSignature)?;

    let mut bytes = signature.to_bytes().to_vec();
    bytes.push(recovery_id.to_byte() + 27);
    Ok(SignedAuthorization {
        authorization,
        signature: bytes,
    })
}

/// Recovers the signer address of `digest`.
fn recover_signer(digest: &[u8; 32], signature: &[u8]) -> Result<Address, DecryptionError> {
    if signature.len() != 65 {
        return Err(DecryptionError::InvalidSignature);
    }
    let sig = Signature::from_slice(&signature[..64]).map_err(|_| DecryptionError::InvalidSignature)?;
    let v = match signature[64] {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => return Err(DecryptionError::InvalidSignature),
    };
    let recovery_id = RecoveryId::try_from(v).map_err(|_| DecryptionError::InvalidSignature)?;
    let key = VerifyingKey::recover_from_prehash(digest, &sig, recovery_id)
        .map_err(|_| DecryptionError::InvalidSignature)?;
    Ok(address_of(&key))
}

/// Current unix time in seconds.
#[must_use]
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Off-chain decryption service for one ledger contract.
pub struct DecryptionRelayer {
    coprocessor: Arc<InMemoryCoprocessor>,
    contract: Address,
}

impl DecryptionRelayer {
    /// Relayer decrypting on behalf of `contract`.
    #[must_use]
    pub fn new(coprocessor: Arc<InMemoryCoprocessor>, contract: Address) -> Self {
        Self {
            coprocessor,
            contract,
        }
    }

    /// Reveals the authorized handles to their requester.
    ///
    /// Booleans are returned as 0 or 1. The uninitialised sentinel decrypts
    /// to 0 without a grant.
    ///
    /// # Errors
    ///
    /// Any failed check in the order listed in the module docs, preceded by
    /// request shape checks.
    pub fn user_decrypt(
        &self,
        signed: &SignedAuthorization,
        grants: &impl GrantView,
        now: u64,
    ) -> Result<Vec<u64>, DecryptionError> {
        let result = self.check_and_reveal(signed, grants, now);

        let outcome = if result.is_ok() { "granted" } else { "rejected" };
        #[cfg(feature = "metrics")]
        tip_telemetry::metrics::DECRYPTIONS
            .with_label_values(&[outcome])
            .inc();

        match &result {
            Ok(values) => debug!(
                requester = %signed.authorization.requester,
                handles = values.len(),
                outcome,
                "User decryption served"
            ),
            Err(e) => warn!(
                requester = %signed.authorization.requester,
                error = %e,
                outcome,
                "User decryption refused"
            ),
        }
        result
    }

    fn check_and_reveal(
        &self,
        signed: &SignedAuthorization,
        grants: &impl GrantView,
        now: u64,
    ) -> Result<Vec<u64>, DecryptionError> {
        let auth = &signed.authorization;

        if auth.handles.is_empty() {
            return Err(DecryptionError::EmptyRequest);
        }
        if auth.contract != self.contract {
            return Err(DecryptionError::ContractMismatch {
                requested: auth.contract,
                served: self.contract,
            });
        }
        if auth.duration_secs > MAX_DECRYPTION_WINDOW_SECS {
            return Err(DecryptionError::DurationTooLong {
                secs: auth.duration_secs,
                max: MAX_DECRYPTION_WINDOW_SECS,
            });
        }
        if now < auth.start_timestamp {
            return Err(DecryptionError::NotYetValid {
                start: auth.start_timestamp,
                now,
            });
        }
        if now >= auth.expires_at() {
            return Err(DecryptionError::Expired {
                expired_at: auth.expires_at(),
                now,
            });
        }

        let recovered = recover_signer(&auth.digest(), &signed.signature)?;
        if recovered != auth.requester {
            return Err(DecryptionError::SignerMismatch {
                recovered,
                requester: auth.requester,
            });
        }

        for handle in auth.handles.iter().filter(|h| !h.is_zero()) {
            for principal in [auth.requester, self.contract] {
                if !grants.is_granted(*handle, principal) {
                    return Err(DecryptionError::NotGranted {
                        handle: *handle,
                        principal,
                    });
                }
            }
        }

        auth.handles
            .iter()
            .map(|handle| match self.coprocessor.reveal(*handle) {
                Some(Plaintext::Uint64(v)) => Ok(v),
                Some(Plaintext::Bool(b)) => Ok(u64::from(b)),
                None => Err(DecryptionError::from(CoprocessorError::UnknownHandle(*handle))),
            })
            .collect()
    }
}
