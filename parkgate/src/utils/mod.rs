//! Utilities for parkgate: small, reusable helpers used across the crate.

pub mod clock;
pub mod hex;
pub mod timeout;

pub use clock::{Clock, ManualClock, SystemClock};
pub use hex::*;
pub use timeout::*;
