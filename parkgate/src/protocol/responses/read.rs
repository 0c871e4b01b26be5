// parkgate/src/protocol/responses/read.rs

use crate::protocol::parser;
use crate::types::BlockData;
use crate::Result;

/// ReadCard: exactly one 16-byte block follows the status byte.
pub fn decode_read(body: &[u8]) -> Result<BlockData> {
    parser::block_at(body, 0)
}
