//! # Adapters Layer (Outer Hexagon)
//!
//! Concrete implementations of the driven ports.
//!
//! - `InMemoryCoprocessor`: mock encrypted algebra and input verifier
//! - `InMemoryEventLog`: event sink
//! - `DecryptionRelayer`: off-chain user decryption against the grant table

pub mod coprocessor;
pub mod event_log;
pub mod relayer;

pub use coprocessor::{InMemoryCoprocessor, Plaintext};
pub use event_log::InMemoryEventLog;
pub use relayer::{
    address_of, sign_authorization, unix_now, DecryptionAuthorization, DecryptionRelayer,
    SignedAuthorization,
};
