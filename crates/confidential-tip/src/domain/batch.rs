//! # Batch Orchestrator
//!
//! Applies [`send_tip`] to up to [`MAX_BATCH_SIZE`] recipients in order.
//! The caller runs the whole batch inside one call, so the first failing
//! entry discards every earlier entry together with its events.

use super::invariants::limits::MAX_BATCH_SIZE;
use super::state::{CallContext, WorldState};
use super::tips::send_tip;
use super::value_objects::{Euint64, ExternalEuint64, InputProof};
use crate::errors::{ArgumentError, LedgerError};

/// Shape checks run before any entry is processed.
///
/// # Errors
///
/// [`ArgumentError::ArrayLengthMismatch`] first, then
/// [`ArgumentError::BatchTooLarge`].
pub fn validate_batch_shape(usernames: usize, amounts: usize, proofs: usize) -> Result<(), ArgumentError> {
    if usernames != amounts || usernames != proofs {
        return Err(ArgumentError::ArrayLengthMismatch {
            usernames,
            amounts,
            proofs,
        });
    }
    if usernames > MAX_BATCH_SIZE {
        return Err(ArgumentError::BatchTooLarge {
            len: usernames,
            max: MAX_BATCH_SIZE,
        });
    }
    Ok(())
}

/// Sends one tip per index, in index order.
///
/// Returns the transferred handles in the same order. An empty batch
/// succeeds and does nothing.
///
/// # Errors
///
/// Shape errors, or the first error returned by an entry.
pub fn batch_send_tips(
    state: &mut WorldState,
    ctx: &mut CallContext<'_>,
    usernames: &[String],
    inputs: Vec<ExternalEuint64>,
    proofs: Vec<InputProof>,
) -> Result<Vec<Euint64>, LedgerError> {
    validate_batch_shape(usernames.len(), inputs.len(), proofs.len())?;

    usernames
        .iter()
        .zip(inputs)
        .zip(proofs)
        .map(|((username, input), proof)| send_tip(state, ctx, username, input, proof))
        .collect()
}
