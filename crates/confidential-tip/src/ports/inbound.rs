//! # Driving Ports (API - Inbound)
//!
//! The public surface of the ledger. Every method takes the authenticated
//! `caller`; the surrounding environment is responsible for authenticating it.
//!
//! State-changing methods commit fully or fail with no effect. Queries never
//! mutate and never create grants.

use crate::domain::value_objects::{
    Address, Euint64, ExternalEuint64, InputProof, TokenMetadata,
};
use crate::errors::LedgerError;
use async_trait::async_trait;

// =============================================================================
// CONFIDENTIAL TOKEN
// =============================================================================

/// Encrypted-balance token.
#[async_trait]
pub trait ConfidentialTokenApi: Send + Sync {
    /// Token name, symbol and decimals.
    async fn token_metadata(&self) -> TokenMetadata;

    /// The administrative principal.
    async fn owner(&self) -> Address;

    /// Mint a public amount to `to`. Owner only.
    ///
    /// # Arguments
    ///
    /// * `caller` - Must be the owner
    /// * `to` - Recipient
    /// * `amount` - Plaintext amount in base units
    ///
    /// # Returns
    ///
    /// * `Ok(Euint64)` - Recipient's new balance handle
    /// * `Err(Unauthorized)` - Caller is not the owner
    async fn mint(&self, caller: Address, to: Address, amount: u64) -> Result<Euint64, LedgerError>;

    /// Transfer an encrypted amount from the caller, clamped to their balance.
    ///
    /// # Returns
    ///
    /// * `Ok(Euint64)` - Handle of the amount actually moved
    /// * `Err(InvalidProof)` - Proof does not bind the input to caller and ledger
    async fn confidential_transfer(
        &self,
        caller: Address,
        to: Address,
        amount: ExternalEuint64,
        proof: InputProof,
    ) -> Result<Euint64, LedgerError>;

    /// Set (overwrite) the caller's allowance for `spender`.
    async fn approve(
        &self,
        caller: Address,
        spender: Address,
        amount: ExternalEuint64,
        proof: InputProof,
    ) -> Result<Euint64, LedgerError>;

    /// Spend `from`'s allowance to the caller, moving funds to `to`.
    ///
    /// # Arguments
    ///
    /// * `requested` - An existing handle the caller is granted on
    ///
    /// # Returns
    ///
    /// * `Ok(Euint64)` - Handle of the amount actually moved
    /// * `Err(Unauthorized)` - Caller has no grant on `requested`
    async fn transfer_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        requested: Euint64,
    ) -> Result<Euint64, LedgerError>;

    /// Caller's balance handle.
    async fn get_balance(&self, caller: Address) -> Euint64;

    /// `account`'s balance handle; the account holder or the owner only.
    async fn get_balance_of(&self, caller: Address, account: Address)
        -> Result<Euint64, LedgerError>;

    /// Caller's allowance handle for `spender`.
    async fn get_allowance(&self, caller: Address, spender: Address) -> Euint64;

    /// Total supply handle. Owner only.
    async fn get_total_supply(&self, caller: Address) -> Result<Euint64, LedgerError>;
}

// =============================================================================
// IDENTITY REGISTRY
// =============================================================================

/// Address to GitHub username registry.
#[async_trait]
pub trait IdentityApi: Send + Sync {
    /// Bind the caller to `username`, once.
    ///
    /// # Returns
    ///
    /// * `Err(InvalidArgument)` - Empty or longer than 39 characters
    /// * `Err(AlreadyRegistered)` - Caller already has a username
    /// * `Err(GitHubUsernameTaken)` - Username belongs to someone else
    async fn register_github_user(&self, caller: Address, username: &str)
        -> Result<(), LedgerError>;

    /// Username of `address`, empty if unregistered.
    async fn get_github_username(&self, address: Address) -> String;

    /// Address of `username`, zero if unregistered.
    async fn get_wallet_address(&self, username: &str) -> Address;

    /// Whether `address` is registered.
    async fn is_registered(&self, address: Address) -> bool;

    /// Whether `username` is claimed.
    async fn github_username_exists(&self, username: &str) -> bool;

    /// Alias of [`github_username_exists`](Self::github_username_exists).
    async fn is_github_username_taken(&self, username: &str) -> bool {
        self.github_username_exists(username).await
    }
}

// =============================================================================
// TIPS
// =============================================================================

/// Username-addressed tipping.
#[async_trait]
pub trait TipApi: Send + Sync {
    /// Tip the holder of `to_username`.
    ///
    /// # Returns
    ///
    /// * `Ok(Euint64)` - Handle of the amount actually moved
    /// * `Err(NotRegistered)` - Caller has no username
    /// * `Err(UserNotFound)` - Nobody holds `to_username`
    /// * `Err(InvalidProof)` - Input does not verify
    async fn send_tip(
        &self,
        caller: Address,
        to_username: &str,
        amount: ExternalEuint64,
        proof: InputProof,
    ) -> Result<Euint64, LedgerError>;

    /// Up to 10 tips as one all-or-nothing unit.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Euint64>)` - Moved amounts in input order
    /// * `Err(InvalidArgument)` - Length mismatch or more than 10 entries
    /// * Any `send_tip` error, in which case no entry takes effect
    async fn batch_send_tips(
        &self,
        caller: Address,
        to_usernames: Vec<String>,
        amounts: Vec<ExternalEuint64>,
        proofs: Vec<InputProof>,
    ) -> Result<Vec<Euint64>, LedgerError>;

    /// Caller's encrypted total of tips sent.
    async fn get_total_tips_sent(&self, caller: Address) -> Result<Euint64, LedgerError>;

    /// Caller's encrypted total of tips received.
    async fn get_total_tips_received(&self, caller: Address) -> Result<Euint64, LedgerError>;
}
