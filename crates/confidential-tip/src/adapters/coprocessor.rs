//! # In-Memory Coprocessor
//!
//! Reference backend for the encrypted algebra. Plaintexts live in a private
//! table keyed by handle; the ledger only ever sees handles. Input proofs are
//! HMAC-SHA256 tags over `(handle, contract, user)` under a per-instance key.
//!
//! Plaintext is reachable only from inside the crate, through
//! [`InMemoryCoprocessor::reveal`], which the decryption relayer uses after
//! checking grants.

use crate::domain::handles::{
    derive_computed, derive_input, derive_trivial, FheOp, HandleOrigin, HandleRecord,
};
use crate::domain::value_objects::{
    Address, Ebool, Euint64, ExternalEuint64, FheType, Handle, InputProof,
};
use crate::errors::{CoprocessorError, LedgerError};
use crate::ports::outbound::{FheCoprocessor, InputVerifier};
use hmac::{Hmac, Mac};
use parking_lot::RwLock;
use rand::RngCore;
use sha2::Sha256;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

type HmacSha256 = Hmac<Sha256>;

/// Decrypted value of a handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Plaintext {
    /// Boolean ciphertext.
    Bool(bool),
    /// `u64` ciphertext.
    Uint64(u64),
}

#[derive(Clone, Debug)]
struct Entry {
    record: HandleRecord,
    value: Plaintext,
}

/// Mock coprocessor holding plaintexts in memory.
pub struct InMemoryCoprocessor {
    entries: RwLock<HashMap<Handle, Entry>>,
    nonce: AtomicU64,
    proof_key: [u8; 32],
}

impl Default for InMemoryCoprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCoprocessor {
    /// Coprocessor with a random proof key.
    #[must_use]
    pub fn new() -> Self {
        let mut key = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut key);
        Self::with_proof_key(key)
    }

    /// Coprocessor with a fixed proof key.
    #[must_use]
    pub fn with_proof_key(proof_key: [u8; 32]) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            nonce: AtomicU64::new(1),
            proof_key,
        }
    }

    /// Number of handles issued so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True if no handle was issued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    // =========================================================================
    // CLIENT SIDE
    // =========================================================================

    /// Encrypts `value` for `user` to submit to `contract`.
    ///
    /// Plays the role of the off-chain encryption service: returns the
    /// ciphertext and a proof the ledger's verifier accepts only for the same
    /// `(contract, user)` pair.
    pub fn encrypt_input(
        &self,
        value: u64,
        contract: Address,
        user: Address,
    ) -> (ExternalEuint64, InputProof) {
        let handle = derive_input(contract, user, self.next_nonce());
        self.store(
            handle,
            HandleOrigin::Input { contract, user },
            FheType::Uint64,
            Plaintext::Uint64(value),
        );

        let proof = self
            .proof_mac(handle, contract, user)
            .map(|mac| mac.finalize().into_bytes().to_vec())
            .unwrap_or_default();
        (ExternalEuint64::from_raw(handle), InputProof::new(proof))
    }

    // =========================================================================
    // PLAINTEXT ACCESS (relayer only)
    // =========================================================================

    /// Plaintext of `handle`. The uninitialised sentinel reads as zero.
    pub(crate) fn reveal(&self, handle: Handle) -> Option<Plaintext> {
        if handle.is_zero() {
            return Some(Plaintext::Uint64(0));
        }
        self.entries.read().get(&handle).map(|entry| entry.value)
    }

    /// Plaintext of a `u64` ciphertext.
    pub(crate) fn reveal_u64(&self, value: Euint64) -> Option<u64> {
        match self.reveal(value.handle()) {
            Some(Plaintext::Uint64(v)) => Some(v),
            _ => None,
        }
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn next_nonce(&self) -> u64 {
        self.nonce.fetch_add(1, Ordering::Relaxed)
    }

    fn store(&self, handle: Handle, origin: HandleOrigin, fhe_type: FheType, value: Plaintext) {
        self.entries.write().insert(
            handle,
            Entry {
                record: HandleRecord { fhe_type, origin },
                value,
            },
        );
    }

    fn proof_mac(&self, handle: Handle, contract: Address, user: Address) -> Option<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.proof_key).ok()?;
        mac.update(handle.as_bytes());
        mac.update(contract.as_bytes());
        mac.update(user.as_bytes());
        Some(mac)
    }

    fn uint(&self, value: Euint64) -> Result<u64, CoprocessorError> {
        let handle = value.handle();
        match self.entries.read().get(&handle).map(|entry| entry.value) {
            Some(Plaintext::Uint64(v)) => Ok(v),
            Some(Plaintext::Bool(_)) => Err(CoprocessorError::TypeMismatch {
                handle,
                expected: FheType::Uint64,
            }),
            None => Err(CoprocessorError::UnknownHandle(handle)),
        }
    }

    fn boolean(&self, value: Ebool) -> Result<bool, CoprocessorError> {
        let handle = value.handle();
        match self.entries.read().get(&handle).map(|entry| entry.value) {
            Some(Plaintext::Bool(b)) => Ok(b),
            Some(Plaintext::Uint64(_)) => Err(CoprocessorError::TypeMismatch {
                handle,
                expected: FheType::Bool,
            }),
            None => Err(CoprocessorError::UnknownHandle(handle)),
        }
    }

    fn computed(&self, op: FheOp, operands: &[Handle], value: Plaintext) -> Handle {
        let handle = derive_computed(op, operands, self.next_nonce());
        self.store(
            handle,
            HandleOrigin::Computed {
                op,
                operands: operands.to_vec(),
            },
            op.output_type(),
            value,
        );
        handle
    }

    fn binary_u64(
        &self,
        op: FheOp,
        lhs: Euint64,
        rhs: Euint64,
        f: impl FnOnce(u64, u64) -> u64,
    ) -> Result<Euint64, CoprocessorError> {
        let value = f(self.uint(lhs)?, self.uint(rhs)?);
        let handle = self.computed(op, &[lhs.handle(), rhs.handle()], Plaintext::Uint64(value));
        Ok(Euint64::from_raw(handle))
    }
}

impl FheCoprocessor for InMemoryCoprocessor {
    fn trivial_encrypt(&self, value: u64) -> Euint64 {
        let handle = derive_trivial(FheType::Uint64, self.next_nonce());
        self.store(
            handle,
            HandleOrigin::Trivial,
            FheType::Uint64,
            Plaintext::Uint64(value),
        );
        Euint64::from_raw(handle)
    }

    fn add(&self, lhs: Euint64, rhs: Euint64) -> Result<Euint64, CoprocessorError> {
        self.binary_u64(FheOp::Add, lhs, rhs, u64::wrapping_add)
    }

    fn sub(&self, lhs: Euint64, rhs: Euint64) -> Result<Euint64, CoprocessorError> {
        self.binary_u64(FheOp::Sub, lhs, rhs, u64::wrapping_sub)
    }

    fn le(&self, lhs: Euint64, rhs: Euint64) -> Result<Ebool, CoprocessorError> {
        let value = self.uint(lhs)? <= self.uint(rhs)?;
        let handle = self.computed(FheOp::Le, &[lhs.handle(), rhs.handle()], Plaintext::Bool(value));
        Ok(Ebool::from_raw(handle))
    }

    fn and(&self, lhs: Ebool, rhs: Ebool) -> Result<Ebool, CoprocessorError> {
        let value = self.boolean(lhs)? & self.boolean(rhs)?;
        let handle = self.computed(FheOp::And, &[lhs.handle(), rhs.handle()], Plaintext::Bool(value));
        Ok(Ebool::from_raw(handle))
    }

    fn select(
        &self,
        cond: Ebool,
        if_true: Euint64,
        if_false: Euint64,
    ) -> Result<Euint64, CoprocessorError> {
        let cond_value = self.boolean(cond)?;
        let true_value = self.uint(if_true)?;
        let false_value = self.uint(if_false)?;
        let value = if cond_value { true_value } else { false_value };

        let handle = self.computed(
            FheOp::Select,
            &[cond.handle(), if_true.handle(), if_false.handle()],
            Plaintext::Uint64(value),
        );
        Ok(Euint64::from_raw(handle))
    }

    fn metadata(&self, handle: Handle) -> Option<HandleRecord> {
        self.entries.read().get(&handle).map(|entry| entry.record.clone())
    }
}

impl InputVerifier for InMemoryCoprocessor {
    fn verify_input(
        &self,
        input: ExternalEuint64,
        proof: InputProof,
        contract: Address,
        user: Address,
    ) -> Result<Euint64, LedgerError> {
        let handle = input.handle();
        let bound = matches!(
            self.metadata(handle),
            Some(HandleRecord {
                fhe_type: FheType::Uint64,
                origin: HandleOrigin::Input { contract: c, user: u },
            }) if c == contract && u == user
        );
        let authentic = self
            .proof_mac(handle, contract, user)
            .is_some_and(|mac| mac.verify_slice(proof.as_bytes()).is_ok());

        if bound && authentic {
            Ok(Euint64::from_raw(handle))
        } else {
            Err(LedgerError::InvalidProof(handle))
        }
    }
}
