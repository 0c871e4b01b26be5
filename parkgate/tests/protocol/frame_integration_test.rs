#[path = "../common/mod.rs"]
mod common;

use parkgate::protocol::codec::encode_command_frame;
use parkgate::protocol::{Command, DecoderState, FrameDecoder, Packet};

#[test]
fn escaped_block_numbers_on_the_wire() {
    let raw = encode_command_frame(0, &Command::ReadCard { block: 3 }).unwrap();
    assert_eq!(raw, common::fixtures::read_block3_frame());

    let raw = encode_command_frame(0, &Command::ReadCard { block: 0x10 }).unwrap();
    assert_eq!(raw, common::fixtures::read_block16_frame());
}

#[test]
fn decoder_yields_pure_frames_from_a_split_stream() {
    let mut stream = vec![0xFF, 0x00];
    stream.extend(common::fixtures::read_block3_frame());
    stream.extend(common::fixtures::search_ok_reply());

    let mut dec = FrameDecoder::new();
    let (head, tail) = stream.split_at(8);
    let mut frames: Vec<Vec<u8>> = dec.feed(head).collect();
    assert!(frames.is_empty());
    assert_eq!(dec.state(), DecoderState::Escaped);
    frames.extend(dec.feed(tail));

    assert_eq!(frames.len(), 2);
    let read = Packet::from_pure(&frames[0]).unwrap();
    assert_eq!(read.command(), 0x4B);
    assert_eq!(read.data(), &[0x03]);
    assert!(read.is_send());

    let reply = Packet::from_pure(&frames[1]).unwrap();
    assert!(reply.is_reply());
    assert_eq!(reply.data(), &[0x00, 0x04, 0x00]);
}

#[test]
fn garbage_between_frames_is_ignored() {
    let mut stream = common::fixtures::search_frame();
    stream.extend([0x55, 0x03, 0x10]);
    stream.extend(common::fixtures::search_frame());
    let mut dec = FrameDecoder::new();
    let frames: Vec<_> = dec.feed(&stream).collect();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0], frames[1]);
}
