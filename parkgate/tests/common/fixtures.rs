// Wire frames and records shared by the tests.

use parkgate::card::TagRecord;
use parkgate::types::VehicleType;

/// SearchCard as the terminal sends it.
pub fn search_frame() -> Vec<u8> {
    hex::decode("0200000446529c03").unwrap()
}

/// Successful SearchCard reply from an S50 card (status, tag type).
pub fn search_ok_reply() -> Vec<u8> {
    hex::decode("02000005460004004f03").unwrap()
}

/// ReadCard of block 3: the block number needs escaping on the wire.
pub fn read_block3_frame() -> Vec<u8> {
    hex::decode("020000044b10035203").unwrap()
}

/// ReadCard of block 0x10.
pub fn read_block16_frame() -> Vec<u8> {
    hex::decode("020000044b10105f03").unwrap()
}

pub fn alice(balance: i32) -> TagRecord {
    TagRecord::new("alice", VehicleType::Sedan, balance)
}

/// Block 1 bytes of `alice`: signature, version, vehicle, NUL padded name.
pub fn alice_owner_block() -> [u8; 16] {
    let mut b = [0u8; 16];
    b[..4].copy_from_slice(&[b'P', b'K', 0x01, 0x01]);
    b[4..9].copy_from_slice(b"alice");
    b
}
