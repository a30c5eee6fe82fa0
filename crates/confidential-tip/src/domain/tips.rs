//! # Tip Dispatcher
//!
//! Routes confidential transfers by GitHub username and keeps encrypted
//! per-account running totals of tips sent and received.

use super::acl::AclTable;
use super::services::or_zero;
use super::state::{CallContext, WorldState};
use super::value_objects::{Address, Euint64, ExternalEuint64, InputProof};
use crate::errors::LedgerError;
use crate::events::LedgerEvent;
use std::collections::HashMap;
use tracing::debug;

/// Encrypted tip counters of one account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TipStat {
    /// Sum of amounts actually moved out by tips.
    pub total_sent: Euint64,
    /// Sum of amounts actually received through tips.
    pub total_received: Euint64,
}

/// Tip counters for all accounts.
#[derive(Clone, Debug, Default)]
pub struct TipBook {
    stats: HashMap<Address, TipStat>,
}

impl TipBook {
    /// Empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters of `account`, uninitialised if it never tipped or was tipped.
    #[must_use]
    pub fn stat(&self, account: Address) -> TipStat {
        self.stats.get(&account).copied().unwrap_or_default()
    }

    /// Adds `transferred` to the sender's sent total and the recipient's
    /// received total. Counters only grow.
    fn record(
        &mut self,
        acl: &mut AclTable,
        ctx: &CallContext<'_>,
        from: Address,
        to: Address,
        transferred: Euint64,
    ) -> Result<(), LedgerError> {
        let fhe = ctx.fhe;

        let sent = fhe.add(or_zero(fhe, self.stat(from).total_sent), transferred)?;
        self.stats.entry(from).or_default().total_sent = sent;
        acl.grant_all(sent.handle(), &[from, ctx.contract]);

        let received = fhe.add(or_zero(fhe, self.stat(to).total_received), transferred)?;
        self.stats.entry(to).or_default().total_received = received;
        acl.grant_all(received.handle(), &[to, ctx.contract]);

        Ok(())
    }

    /// Every stored handle, for grant audits.
    pub(crate) fn stored_handles(&self) -> impl Iterator<Item = Euint64> + '_ {
        self.stats
            .values()
            .flat_map(|stat| [stat.total_sent, stat.total_received])
            .filter(Euint64::is_initialized)
    }
}

/// Sends an encrypted tip from the caller to the holder of `to_username`.
///
/// Returns the handle of the amount actually moved.
///
/// # Errors
///
/// [`LedgerError::NotRegistered`] if the caller has no username,
/// [`LedgerError::UserNotFound`] if nobody holds `to_username`,
/// [`LedgerError::InvalidProof`] if the input does not verify.
pub fn send_tip(
    state: &mut WorldState,
    ctx: &mut CallContext<'_>,
    to_username: &str,
    input: ExternalEuint64,
    proof: InputProof,
) -> Result<Euint64, LedgerError> {
    let from = ctx.caller;
    if !state.registry.is_registered(from) {
        return Err(LedgerError::NotRegistered(from));
    }
    let to = state.registry.wallet_address(to_username);
    if to.is_zero() {
        return Err(LedgerError::UserNotFound(to_username.to_string()));
    }

    let amount = ctx.verifier.verify_input(input, proof, ctx.contract, from)?;
    let transferred = state.ledger.transfer(&mut state.acl, ctx, from, to, amount)?;
    state.tips.record(&mut state.acl, ctx, from, to, transferred)?;

    debug!(from = %from, to = %to, username = to_username, "Tip dispatched");
    ctx.emit(LedgerEvent::TipSent {
        from,
        to,
        to_username: to_username.to_string(),
        transferred,
    });
    Ok(transferred)
}

/// Caller's total-sent counter.
///
/// # Errors
///
/// [`LedgerError::NotRegistered`] if the caller has no username.
pub fn total_tips_sent(state: &WorldState, caller: Address) -> Result<Euint64, LedgerError> {
    require_registered(state, caller)?;
    Ok(state.tips.stat(caller).total_sent)
}

/// Caller's total-received counter.
///
/// # Errors
///
/// [`LedgerError::NotRegistered`] if the caller has no username.
pub fn total_tips_received(state: &WorldState, caller: Address) -> Result<Euint64, LedgerError> {
    require_registered(state, caller)?;
    Ok(state.tips.stat(caller).total_received)
}

fn require_registered(state: &WorldState, caller: Address) -> Result<(), LedgerError> {
    if state.registry.is_registered(caller) {
        Ok(())
    } else {
        Err(LedgerError::NotRegistered(caller))
    }
}
