// parkgate/src/protocol/commands/write.rs

use crate::types::BlockData;

/// Encode WriteCard data (command code 0x4C)
/// Layout: block(1) + data(16)
pub fn encode_write(block: u8, data: &BlockData) -> Vec<u8> {
    let mut buf = Vec::with_capacity(17);
    buf.push(block);
    buf.extend_from_slice(data.as_bytes());
    buf
}
