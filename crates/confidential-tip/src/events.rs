//! # Ledger Events
//!
//! Audit events emitted by committed calls. Events carry handles, never
//! plaintext amounts; `Mint` carries the new balance handle rather than the
//! minted amount.

use crate::domain::value_objects::{Address, Euint64};
use serde::{Deserialize, Serialize};

/// Event emitted by a committed call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Owner minted to `to`; `balance` is the recipient's new balance.
    Mint {
        /// Recipient.
        to: Address,
        /// New balance handle of the recipient.
        balance: Euint64,
    },

    /// Direct confidential transfer.
    EncryptedTransfer {
        /// Sender.
        from: Address,
        /// Recipient.
        to: Address,
        /// Amount actually moved (after clamping).
        transferred: Euint64,
    },

    /// Tip routed by GitHub username.
    TipSent {
        /// Sender.
        from: Address,
        /// Resolved recipient address.
        to: Address,
        /// Recipient username as supplied.
        to_username: String,
        /// Amount actually moved (after clamping).
        transferred: Euint64,
    },
}

impl LedgerEvent {
    /// Topic the event is published under.
    #[must_use]
    pub const fn topic(&self) -> &'static str {
        match self {
            Self::Mint { .. } => topics::MINT,
            Self::EncryptedTransfer { .. } => topics::ENCRYPTED_TRANSFER,
            Self::TipSent { .. } => topics::TIP_SENT,
        }
    }
}

/// Event topic names.
pub mod topics {
    /// Owner mint.
    pub const MINT: &str = "ledger.mint";

    /// Direct confidential transfer.
    pub const ENCRYPTED_TRANSFER: &str = "ledger.encrypted_transfer";

    /// Username-addressed tip.
    pub const TIP_SENT: &str = "tips.tip_sent";
}
