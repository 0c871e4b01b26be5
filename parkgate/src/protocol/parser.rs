// parkgate/src/protocol/parser.rs

use crate::types::{BlockData, CardId};
use crate::{Error, Result};

/// Ensure the slice has at least `min` bytes.
pub fn ensure_len(data: &[u8], min: usize) -> Result<()> {
    if data.len() < min {
        return Err(Error::InvalidLength {
            expected: min,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Return a subslice with bounds checking.
pub fn slice_at(data: &[u8], idx: usize, len: usize) -> Result<&[u8]> {
    ensure_len(data, idx + len)?;
    Ok(&data[idx..idx + len])
}

/// Read a single byte at `idx` with bounds checking.
pub fn byte_at(data: &[u8], idx: usize) -> Result<u8> {
    ensure_len(data, idx + 1)?;
    Ok(data[idx])
}

/// Split a reply data field into its status byte and the rest. A nonzero
/// status becomes `CardStatus` for `command`.
pub fn expect_success(command: u8, data: &[u8]) -> Result<&[u8]> {
    let status = byte_at(data, 0)?;
    if status != 0 {
        return Err(Error::CardStatus { command, status });
    }
    Ok(&data[1..])
}

/// Everything from `start` to the end as a card identifier.
pub fn card_id_from(data: &[u8], start: usize) -> Result<CardId> {
    ensure_len(data, start + 1)?;
    CardId::try_from(&data[start..])
}

/// A 16-byte block at `start`.
pub fn block_at(data: &[u8], start: usize) -> Result<BlockData> {
    BlockData::try_from(slice_at(data, start, 16)?)
}
