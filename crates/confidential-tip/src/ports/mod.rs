//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions between the ledger domain and the outside world.
//!
//! - **Driving Ports (Inbound)**: `ConfidentialTokenApi`, `IdentityApi`, `TipApi`
//! - **Driven Ports (Outbound)**: `FheCoprocessor`, `InputVerifier`,
//!   `EventPublisher`, `GrantView`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
