//! # Identity Registry
//!
//! One-to-one mapping between addresses and GitHub usernames. Registration
//! is permanent; names are compared exactly (case-sensitive).

use super::invariants::limits::MAX_USERNAME_LEN;
use super::value_objects::Address;
use crate::errors::{ArgumentError, LedgerError};
use std::collections::HashMap;

/// Bidirectional address/username index.
#[derive(Clone, Debug, Default)]
pub struct IdentityRegistry {
    by_address: HashMap<Address, String>,
    by_username: HashMap<String, Address>,
}

/// Validates username length bounds (1 to [`MAX_USERNAME_LEN`] characters).
///
/// # Errors
///
/// [`ArgumentError::EmptyUsername`] or [`ArgumentError::UsernameTooLong`].
pub fn validate_username(username: &str) -> Result<(), ArgumentError> {
    let len = username.chars().count();
    if len == 0 {
        return Err(ArgumentError::EmptyUsername);
    }
    if len > MAX_USERNAME_LEN {
        return Err(ArgumentError::UsernameTooLong {
            len,
            max: MAX_USERNAME_LEN,
        });
    }
    Ok(())
}

impl IdentityRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `caller` to `username`.
    ///
    /// Checks run in order: length bounds, caller already registered,
    /// username already claimed.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidArgument`], [`LedgerError::AlreadyRegistered`],
    /// or [`LedgerError::GitHubUsernameTaken`].
    pub fn register(&mut self, caller: Address, username: &str) -> Result<(), LedgerError> {
        validate_username(username)?;

        if self.by_address.contains_key(&caller) {
            return Err(LedgerError::AlreadyRegistered(caller));
        }
        if self.by_username.contains_key(username) {
            return Err(LedgerError::GitHubUsernameTaken(username.to_string()));
        }

        self.by_address.insert(caller, username.to_string());
        self.by_username.insert(username.to_string(), caller);
        Ok(())
    }

    /// Username of `address`, empty string if unregistered.
    #[must_use]
    pub fn github_username(&self, address: Address) -> &str {
        self.by_address.get(&address).map_or("", String::as_str)
    }

    /// Address of `username`, zero address if unregistered.
    #[must_use]
    pub fn wallet_address(&self, username: &str) -> Address {
        self.by_username.get(username).copied().unwrap_or(Address::ZERO)
    }

    /// Whether `address` has a username.
    #[must_use]
    pub fn is_registered(&self, address: Address) -> bool {
        self.by_address.contains_key(&address)
    }

    /// Whether `username` is claimed.
    #[must_use]
    pub fn username_exists(&self, username: &str) -> bool {
        self.by_username.contains_key(username)
    }

    /// Number of registered identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_address.len()
    }

    /// True if nobody registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_address.is_empty()
    }

    /// All `(address, username)` pairs.
    pub fn identities(&self) -> impl Iterator<Item = (Address, &str)> + '_ {
        self.by_address
            .iter()
            .map(|(address, name)| (*address, name.as_str()))
    }

    /// Forward map size and reverse map size, equal when consistent.
    pub(crate) fn index_sizes(&self) -> (usize, usize) {
        (self.by_address.len(), self.by_username.len())
    }
}
