// parkgate/src/protocol/commands/read.rs

/// Encode ReadCard data (command code 0x4B): block number
pub fn encode_read(block: u8) -> Vec<u8> {
    vec![block]
}
