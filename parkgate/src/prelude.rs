// parkgate/src/prelude.rs

pub use crate::card::{CardSession, TagRecord};
pub use crate::config::{PortConfig, TerminalConfig};
pub use crate::parking::{ElapsedSeconds, FeePolicy, HourlyRate, ParkingLedger, ParkingRow};
pub use crate::protocol::{Command, Response};
pub use crate::reader::Reader;
pub use crate::terminal::{
    InputRequest, RegistrationForm, SessionMode, Terminal, TerminalBuilder, TerminalObserver,
};
pub use crate::transport::{EmulatedCard, EmulatedReader, MockTransport, Transport};
pub use crate::utils::{Clock, ManualClock, SystemClock};
pub use crate::{BlockData, CardId, CardKind, CommandCode, Error, Result, VehicleType};

// Re-export small utilities for convenience
pub use crate::utils::{bytes_to_hex, bytes_to_hex_spaced, ms, parse_hex};
