// parkgate/src/protocol/checksum.rs

/// Packet checksum: 8-bit wrapping sum of the address (low byte, high byte),
/// the length byte, the command byte and every data byte.
pub fn checksum(address: u16, length: u8, command: u8, data: &[u8]) -> u8 {
    let [lo, hi] = address.to_le_bytes();
    data.iter()
        .fold(lo.wrapping_add(hi).wrapping_add(length).wrapping_add(command), |acc, &b| {
            acc.wrapping_add(b)
        })
}
