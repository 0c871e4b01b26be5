// parkgate/src/transport/mod.rs

pub mod emulator;
pub mod mock;
#[cfg(feature = "serial")]
pub mod serial;
pub mod traits;

pub use emulator::{EmulatedCard, EmulatedReader};
pub use mock::MockTransport;
#[cfg(feature = "serial")]
pub use serial::SerialTransport;
pub use traits::Transport;
