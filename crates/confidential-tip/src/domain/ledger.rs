//! # Confidential Ledger
//!
//! Encrypted balances, allowances and total supply.
//!
//! Insufficient balance or allowance is never an error: the moved amount is
//! clamped inside the encrypted domain with `select`, so success and failure
//! look the same to an observer.
//!
//! Grant policy for every handle this module stores:
//!
//! | Handle | Granted to |
//! |--------|-----------|
//! | balance | holder, owner, contract |
//! | allowance | holder, spender, contract |
//! | transferred amount | sender, recipient, contract (and spender for `transfer_from`) |
//! | total supply | owner, contract |

use super::acl::AclTable;
use super::services::{min, or_zero};
use super::state::CallContext;
use super::value_objects::{Address, Euint64, ExternalEuint64, InputProof, TokenMetadata};
use crate::errors::LedgerError;
use crate::events::LedgerEvent;
use std::collections::HashMap;
use tracing::debug;

/// Ledger state exclusively owned by this module.
#[derive(Clone, Debug)]
pub struct ConfidentialLedger {
    owner: Address,
    token: TokenMetadata,
    balances: HashMap<Address, Euint64>,
    allowances: HashMap<(Address, Address), Euint64>,
    total_supply: Euint64,
}

impl ConfidentialLedger {
    /// Empty ledger administered by `owner`.
    #[must_use]
    pub fn new(owner: Address, token: TokenMetadata) -> Self {
        Self {
            owner,
            token,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            total_supply: Euint64::UNINITIALIZED,
        }
    }

    /// The administrative principal.
    #[must_use]
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Token name, symbol and decimals.
    #[must_use]
    pub fn token(&self) -> &TokenMetadata {
        &self.token
    }

    fn require_owner(&self, caller: Address, operation: &'static str) -> Result<(), LedgerError> {
        if caller == self.owner {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized { caller, operation })
        }
    }

    // =========================================================================
    // STATE-CHANGING OPERATIONS
    // =========================================================================

    /// Mints a public `amount` to `to`. Owner only.
    ///
    /// Returns the new balance handle of `to`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Unauthorized`] if the caller is not the owner.
    pub fn mint(
        &mut self,
        acl: &mut AclTable,
        ctx: &mut CallContext<'_>,
        to: Address,
        amount: u64,
    ) -> Result<Euint64, LedgerError> {
        self.require_owner(ctx.caller, "mint")?;
        let fhe = ctx.fhe;

        let encrypted = fhe.trivial_encrypt(amount);
        let balance = fhe.add(or_zero(fhe, self.balance(to)), encrypted)?;
        let supply = fhe.add(or_zero(fhe, self.total_supply), encrypted)?;

        self.balances.insert(to, balance);
        self.total_supply = supply;

        acl.grant_all(balance.handle(), &[to, self.owner, ctx.contract]);
        acl.grant_all(supply.handle(), &[self.owner, ctx.contract]);

        debug!(to = %to, balance = %balance.handle(), "Minted");
        ctx.emit(LedgerEvent::Mint { to, balance });
        Ok(balance)
    }

    /// Moves an externally encrypted amount from the caller to `to`.
    ///
    /// Returns the handle of the amount actually moved, which equals the
    /// requested amount when covered by the balance and the whole balance
    /// otherwise.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidProof`] if `proof` does not bind `input` to the
    /// caller and this ledger.
    pub fn confidential_transfer(
        &mut self,
        acl: &mut AclTable,
        ctx: &mut CallContext<'_>,
        to: Address,
        input: ExternalEuint64,
        proof: InputProof,
    ) -> Result<Euint64, LedgerError> {
        let amount = ctx
            .verifier
            .verify_input(input, proof, ctx.contract, ctx.caller)?;
        let from = ctx.caller;
        let transferred = self.transfer(acl, ctx, from, to, amount)?;

        ctx.emit(LedgerEvent::EncryptedTransfer {
            from,
            to,
            transferred,
        });
        Ok(transferred)
    }

    /// Clamped transfer of an already verified amount. Emits nothing.
    ///
    /// `transferred = select(amount <= balance[from], amount, balance[from])`
    pub(crate) fn transfer(
        &mut self,
        acl: &mut AclTable,
        ctx: &CallContext<'_>,
        from: Address,
        to: Address,
        amount: Euint64,
    ) -> Result<Euint64, LedgerError> {
        let fhe = ctx.fhe;
        let balance = or_zero(fhe, self.balance(from));

        let covered = fhe.le(amount, balance)?;
        let transferred = fhe.select(covered, amount, balance)?;

        self.move_balance(acl, ctx, from, to, transferred)?;
        acl.grant_all(transferred.handle(), &[from, to, ctx.contract]);
        Ok(transferred)
    }

    /// Overwrites the caller's allowance for `spender`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidProof`] if the proof does not verify.
    pub fn approve(
        &mut self,
        acl: &mut AclTable,
        ctx: &mut CallContext<'_>,
        spender: Address,
        input: ExternalEuint64,
        proof: InputProof,
    ) -> Result<Euint64, LedgerError> {
        let amount = ctx
            .verifier
            .verify_input(input, proof, ctx.contract, ctx.caller)?;

        self.allowances.insert((ctx.caller, spender), amount);
        acl.grant_all(amount.handle(), &[ctx.caller, spender, ctx.contract]);

        debug!(owner = %ctx.caller, spender = %spender, allowance = %amount.handle(), "Approved");
        Ok(amount)
    }

    /// Spends from `from`'s allowance to the caller, moving funds to `to`.
    ///
    /// `requested` must be a handle the caller holds a grant on, typically
    /// the allowance itself. The moved amount is
    /// `select(requested <= allowance && requested <= balance, requested, min(allowance, balance))`.
    ///
    /// This is the only place ledger logic reads the grant table. The check
    /// is on the caller's right to use an existing ciphertext as an operand
    /// and reveals nothing about plaintext; every other grant lookup belongs
    /// to the decryption relayer.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Unauthorized`] if the caller has no grant on `requested`.
    pub fn transfer_from(
        &mut self,
        acl: &mut AclTable,
        ctx: &mut CallContext<'_>,
        from: Address,
        to: Address,
        requested: Euint64,
    ) -> Result<Euint64, LedgerError> {
        let spender = ctx.caller;
        if !acl.is_granted(requested.handle(), spender) {
            return Err(LedgerError::Unauthorized {
                caller: spender,
                operation: "use ciphertext handle",
            });
        }

        let fhe = ctx.fhe;
        let allowance = or_zero(fhe, self.allowance(from, spender));
        let balance = or_zero(fhe, self.balance(from));

        let within_allowance = fhe.le(requested, allowance)?;
        let within_balance = fhe.le(requested, balance)?;
        let within_both = fhe.and(within_allowance, within_balance)?;
        let cap = min(fhe, allowance, balance)?;
        let transferred = fhe.select(within_both, requested, cap)?;

        let remaining = fhe.sub(allowance, transferred)?;
        self.allowances.insert((from, spender), remaining);
        acl.grant_all(remaining.handle(), &[from, spender, ctx.contract]);

        self.move_balance(acl, ctx, from, to, transferred)?;
        acl.grant_all(transferred.handle(), &[from, to, spender, ctx.contract]);
        Ok(transferred)
    }

    /// `balance[from] -= amount; balance[to] += amount`, with `amount <= balance[from]`.
    ///
    /// Debits before crediting so that `from == to` leaves the balance unchanged.
    fn move_balance(
        &mut self,
        acl: &mut AclTable,
        ctx: &CallContext<'_>,
        from: Address,
        to: Address,
        amount: Euint64,
    ) -> Result<(), LedgerError> {
        let fhe = ctx.fhe;

        let debited = fhe.sub(or_zero(fhe, self.balance(from)), amount)?;
        self.balances.insert(from, debited);
        acl.grant_all(debited.handle(), &[from, self.owner, ctx.contract]);

        let credited = fhe.add(or_zero(fhe, self.balance(to)), amount)?;
        self.balances.insert(to, credited);
        acl.grant_all(credited.handle(), &[to, self.owner, ctx.contract]);

        Ok(())
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Balance handle of `account`, uninitialised if never written.
    #[must_use]
    pub fn balance(&self, account: Address) -> Euint64 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    /// Allowance handle of `(owner, spender)`, uninitialised if never written.
    #[must_use]
    pub fn allowance(&self, owner: Address, spender: Address) -> Euint64 {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    /// Balance of `account` as seen by `caller`.
    ///
    /// Permitted for the account holder and the owner.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Unauthorized`] for anyone else.
    pub fn balance_of(&self, caller: Address, account: Address) -> Result<Euint64, LedgerError> {
        if caller != account && caller != self.owner {
            return Err(LedgerError::Unauthorized {
                caller,
                operation: "view balance",
            });
        }
        Ok(self.balance(account))
    }

    /// Total supply handle. Owner only.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Unauthorized`] for non-owners.
    pub fn total_supply(&self, caller: Address) -> Result<Euint64, LedgerError> {
        self.require_owner(caller, "view total supply")?;
        Ok(self.total_supply)
    }

    /// Every account holding a balance handle.
    pub fn accounts(&self) -> impl Iterator<Item = Address> + '_ {
        self.balances.keys().copied()
    }

    /// Every stored handle, for grant audits.
    pub(crate) fn stored_handles(&self) -> impl Iterator<Item = Euint64> + '_ {
        self.balances
            .values()
            .chain(self.allowances.values())
            .copied()
            .chain(std::iter::once(self.total_supply))
            .filter(Euint64::is_initialized)
    }

    /// Balance handles with their holders, for grant audits.
    pub(crate) fn balance_entries(&self) -> impl Iterator<Item = (Address, Euint64)> + '_ {
        self.balances.iter().map(|(account, balance)| (*account, *balance))
    }
}
