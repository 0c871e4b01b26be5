// parkgate/src/protocol/responses/auth.rs

use crate::Result;

/// Authentication reply has no payload beyond the status byte.
pub fn decode_authentication(_body: &[u8]) -> Result<()> {
    Ok(())
}
