#[path = "../common/mod.rs"]
mod common;

use parkgate::protocol::codec::{encode_command_frame, encode_command_packet};
use parkgate::protocol::Command;
use parkgate::{BlockData, CardId, CommandCode};

#[test]
fn search_matches_fixture() {
    let raw = encode_command_frame(0, &Command::search()).unwrap();
    assert_eq!(raw, common::fixtures::search_frame());
}

#[test]
fn authentication_carries_key_a_block_and_key() {
    let cmd = Command::Authentication {
        block: 1,
        key: [0xFF; 6],
    };
    let packet = encode_command_packet(0, &cmd).unwrap();
    assert_eq!(packet.command(), CommandCode::Authentication.as_u8());
    assert_eq!(
        packet.data(),
        &[0x60, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
    );
    assert_eq!(packet.length(), 11);
}

#[test]
fn select_and_write_payloads() {
    let uid = CardId::from_bytes(&[0xAA, 0xBB, 0xCC, 0xDD]);
    let packet = encode_command_packet(0x0102, &Command::SelectCard { card_id: uid }).unwrap();
    assert_eq!(packet.address(), 0x0102);
    assert_eq!(packet.data(), &[0xAA, 0xBB, 0xCC, 0xDD]);

    let data = BlockData::from_bytes(common::fixtures::alice_owner_block());
    let packet = encode_command_packet(0, &Command::WriteCard { block: 1, data }).unwrap();
    assert_eq!(packet.data().len(), 17);
    assert_eq!(packet.data()[0], 1);
    assert_eq!(&packet.data()[1..3], b"PK");
}
