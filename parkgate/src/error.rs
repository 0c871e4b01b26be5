// parkgate/src/error.rs

use thiserror::Error;

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid packet length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },
    #[error("frame format error: {0}")]
    FrameFormat(String),

    #[error("unexpected command: expected {expected:#04x}, got {actual:#04x}")]
    UnexpectedCommand { expected: u8, actual: u8 },

    #[error("unknown command code {0:#04x}")]
    UnknownCommand(u8),

    #[error("command {command:#04x} failed: status={status:#04x}")]
    CardStatus { command: u8, status: u8 },

    #[error("command {pending:#04x} still awaiting reply")]
    Busy { pending: u8 },

    #[error("transport is not open")]
    NotOpen,

    #[error("transport is already open")]
    AlreadyOpen,

    #[error("command {command:#04x} timed out")]
    Timeout { command: u8 },

    #[error("card is not authenticated")]
    NotAuthenticated,

    #[error("card record is invalid (signature mismatch)")]
    RecordInvalid,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("transport error: {0}")]
    Transport(String),

    // シリアル実装を後から有効化できるように optional dependency にしている
    #[cfg(feature = "serial")]
    #[error("serial error: {0}")]
    Serial(#[from] serialport::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
