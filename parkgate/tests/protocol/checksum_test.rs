#[path = "../common/mod.rs"]
mod common;

use parkgate::protocol::{checksum, Packet};

#[test]
fn checksum_examples() {
    assert_eq!(checksum(0x0000, 0x04, 0x46, &[0x52]), 0x9c);
    assert_eq!(checksum(0x0000, 0x03, 0x00, &[]), 0x03);
    // wraps modulo 256
    assert_eq!(checksum(0xFFFF, 0xFF, 0xFF, &[0x01]), 0xFD);
}

#[test]
fn tampered_checksum_rejected() {
    let mut raw = common::fixtures::search_frame();
    raw[6] = 0x9d;
    assert!(matches!(
        Packet::from_raw(&raw),
        Err(parkgate::Error::ChecksumMismatch {
            expected: 0x9c,
            actual: 0x9d
        })
    ));
}
