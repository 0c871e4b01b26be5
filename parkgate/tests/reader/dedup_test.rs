#[path = "../common/mod.rs"]
mod common;

use std::time::{Duration, Instant};

use parkgate::protocol::{Command, Packet};
use parkgate::reader::{DedupGuard, Reader};
use parkgate::transport::MockTransport;
use parkgate::{PortConfig, TerminalConfig};

fn read_reply(fill: u8) -> Vec<u8> {
    let mut data = vec![0x00];
    data.extend_from_slice(&[fill; 16]);
    data
}

#[test]
fn window_and_retention() {
    let mut g = DedupGuard::new(Duration::from_millis(800), Duration::from_secs(3));
    let t0 = Instant::now();
    assert!(!g.is_duplicate(0x4B, Some(1), &read_reply(0x01), t0));
    assert!(g.is_duplicate(0x4B, Some(2), &read_reply(0x01), t0 + Duration::from_millis(799)));
    // different payload, different event
    assert!(!g.is_duplicate(0x4B, Some(2), &read_reply(0x02), t0));
    // outside the window the same reply counts again
    assert!(!g.is_duplicate(0x4B, Some(2), &read_reply(0x01), t0 + Duration::from_millis(1700)));

    g.prune(t0 + Duration::from_secs(10));
    assert!(g.is_empty());
}

#[test]
fn late_copy_in_a_later_read_is_dropped() {
    common::init_logging();
    let mock = MockTransport::new();
    let mut r = Reader::new(Box::new(mock.clone()), &TerminalConfig::default());
    r.open(&PortConfig::default()).unwrap();
    let owner = Packet::reply(0, 0x4B, &read_reply(0x50)).unwrap().to_raw();
    let t0 = Instant::now();

    r.send(Command::ReadCard { block: 1 }, t0).unwrap();
    mock.push_incoming(&owner);
    r.pump(t0).unwrap();
    assert!(r.next_reply(t0).is_some());

    r.send(Command::ReadCard { block: 2 }, t0 + Duration::from_millis(50)).unwrap();
    mock.push_incoming(&owner);
    let t1 = t0 + Duration::from_millis(100);
    r.pump(t1).unwrap();
    assert!(r.next_reply(t1).is_none());
    assert_eq!(r.pending_code().map(|c| c.as_u8()), Some(0x4B));
}
