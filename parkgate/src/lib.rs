// parkgate/src/lib.rs

//! parkgate
//!
//! Unattended parking-lot terminal for ISO 14443 (Mifare S50/S70) cards
//! behind a framed serial reader module.
//!
//! Layers, bottom up: `protocol` (frame codec and packet model), `reader`
//! (one command in flight, retry, duplicate suppression), `card` (session
//! and on-tag record), `terminal` (entry/exit, registration and recharge
//! flows) with `parking` holding the ledger and fee policy.

pub mod card;
pub mod config;
pub mod constants;
pub mod error;
pub mod parking;
pub mod prelude;
pub mod protocol;
pub mod reader;
pub mod terminal;
pub mod test_support;
pub mod transport;
pub mod types;
pub mod utils;

// Re-export common types at crate root so `crate::Error`, `crate::Result`,
// and the newtypes in `types` are available everywhere.
pub use crate::error::*;
pub use crate::types::*;

pub use prelude::*;
