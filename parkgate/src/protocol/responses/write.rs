// parkgate/src/protocol/responses/write.rs

use crate::Result;

/// WriteCard reply has no payload beyond the status byte.
pub fn decode_write(_body: &[u8]) -> Result<()> {
    Ok(())
}
