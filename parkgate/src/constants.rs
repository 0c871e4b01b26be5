// parkgate/src/constants.rs
//! Common protocol constants used across the crate

/// Frame start marker
pub const FRAME_START: u8 = 0x02;

/// Frame stop marker
pub const FRAME_STOP: u8 = 0x03;

/// Escape byte; the byte following it is taken literally
pub const FRAME_ESCAPE: u8 = 0x10;

/// Smallest pure frame: start + addr(2) + len + cmd + checksum + stop
pub const MIN_PURE_FRAME_LEN: usize = 7;

/// Largest data field a single length byte can describe on a send packet
pub const MAX_PACKET_DATA_LEN: usize = 0xFF - 3;

/// Send packets account for cmd + data + checksum in the length byte.
pub const SEND_LENGTH_OVERHEAD: usize = 3;

/// Reader replies carry one fewer length unit than outgoing commands.
pub const REPLY_LENGTH_OVERHEAD: usize = 2;

/// Reader module address used by this application
pub const DEFAULT_ADDRESS: u16 = 0x0000;

/// SearchCard request mode: wake all cards in the field
pub const SEARCH_MODE_ALL: u8 = 0x52;

/// AntiColl bit count argument
pub const ANTICOLL_BIT_COUNT: u8 = 0x04;

/// Authentication with key A
pub const AUTH_KEY_A: u8 = 0x60;

/// Default key A shipped on blank S50 cards
pub const DEFAULT_AUTH_KEY: [u8; 6] = [0xFF; 6];

/// SelectCard type byte reported by S50 (Mifare Classic 1K) cards
pub const S50_TYPE_BYTE: u8 = 0x08;

/// Size of one card block in bytes
pub const BLOCK_SIZE: usize = 16;

/// Block holding the signature, vehicle type and owner name
pub const OWNER_BLOCK: u8 = 1;

/// Block holding the balance
pub const BALANCE_BLOCK: u8 = 2;

/// Signature written at the start of the owner block
pub const TAG_SIGNATURE: [u8; 2] = *b"PK";

/// Format version written after the signature
pub const TAG_FORMAT_VERSION: u8 = 0x01;

/// Width of the owner name field
pub const OWNER_NAME_LEN: usize = 12;

/// Upper bound accepted for initial balances and recharge amounts
pub const DEFAULT_MAX_BALANCE: i32 = 100_000;
