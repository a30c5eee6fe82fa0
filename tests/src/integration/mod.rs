//! Cross-module flows through the public service API.

pub mod harness;
pub mod ledger_flows;
pub mod observability;
pub mod properties;
pub mod tipping_flows;
