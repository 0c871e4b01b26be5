#[path = "../common/mod.rs"]
mod common;

use parkgate::card::TagRecord;
use parkgate::protocol::codec::decode_reply;
use parkgate::protocol::{Packet, Response};
use parkgate::{BlockData, CardKind, CommandCode, Error};

fn reply(cmd: u8, data: &[u8]) -> Packet {
    Packet::reply(0, cmd, data).unwrap()
}

#[test]
fn search_reply_from_fixture() {
    let packet = Packet::from_raw(&common::fixtures::search_ok_reply()).unwrap();
    let (code, resp) = decode_reply(&packet).unwrap();
    assert_eq!(code, CommandCode::SearchCard);
    assert_eq!(resp, Response::CardFound);
}

#[test]
fn select_reports_card_kind() {
    let (_, resp) = decode_reply(&reply(0x48, &[0x00, 0x08])).unwrap();
    assert_eq!(resp, Response::Selected { kind: CardKind::S50 });
    let (_, resp) = decode_reply(&reply(0x48, &[0x00, 0x18])).unwrap();
    assert_eq!(resp, Response::Selected { kind: CardKind::S70 });
}

#[test]
fn read_reply_decodes_into_record() {
    let mut data = vec![0x00];
    data.extend_from_slice(&common::fixtures::alice_owner_block());
    let (_, resp) = decode_reply(&reply(0x4B, &data)).unwrap();
    let Response::Block(b1) = resp else {
        panic!("expected block, got {:?}", resp);
    };

    let mut b2 = [0u8; 16];
    b2[..4].copy_from_slice(&250i32.to_le_bytes());
    let record = TagRecord::decode(&b1, &BlockData::from_bytes(b2)).unwrap();
    assert_eq!(record, common::fixtures::alice(250));
}

#[test]
fn nonzero_status_and_empty_payload_fail() {
    let err = decode_reply(&reply(0x4A, &[0x02])).unwrap_err();
    assert!(matches!(
        err,
        Error::CardStatus {
            command: 0x4A,
            status: 0x02
        }
    ));
    assert!(matches!(
        decode_reply(&reply(0x4C, &[])),
        Err(Error::InvalidLength { .. })
    ));
}

#[test]
fn unknown_command_code_rejected() {
    assert!(matches!(
        decode_reply(&reply(0x99, &[0x00])),
        Err(Error::UnknownCommand(0x99))
    ));
}
