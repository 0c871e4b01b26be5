// parkgate/src/protocol/commands/auth.rs

use crate::constants::AUTH_KEY_A;

/// Encode Authentication data (command code 0x4A)
/// Layout: key mode(1) = 0x60 + block(1) + key(6)
pub fn encode_authentication(block: u8, key: &[u8; 6]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8);
    buf.push(AUTH_KEY_A);
    buf.push(block);
    buf.extend_from_slice(key);
    buf
}
