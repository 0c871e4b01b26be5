#[path = "../common/mod.rs"]
mod common;

use std::time::{Duration, Instant};

use parkgate::config::{PortConfig, TerminalConfig};
use parkgate::protocol::{Command, Response};
use parkgate::reader::Reader;
use parkgate::transport::{EmulatedCard, EmulatedReader};
use parkgate::{CardId, Error};

fn reader_over(emu: &EmulatedReader, config: &TerminalConfig) -> Reader {
    common::init_logging();
    let mut r = Reader::new(Box::new(emu.clone()), config);
    r.open(&PortConfig::default()).unwrap();
    r
}

#[test]
fn full_identification_chain() {
    let emu = EmulatedReader::new();
    let idx = emu.add_card(EmulatedCard::new(&common::uid(0x40)));
    emu.present_card(idx);
    let mut r = reader_over(&emu, &TerminalConfig::default());
    let now = Instant::now();

    let exchange = |r: &mut Reader, cmd: Command| -> Response {
        r.send(cmd, now).unwrap();
        r.pump(now).unwrap();
        r.next_reply(now).unwrap().response().unwrap()
    };

    assert_eq!(exchange(&mut r, Command::search()), Response::CardFound);
    let id = match exchange(&mut r, Command::anticoll()) {
        Response::AntiColl { card_id } => card_id,
        other => panic!("unexpected {:?}", other),
    };
    assert_eq!(id, CardId::from_bytes(&common::uid(0x40)));
    assert!(matches!(
        exchange(&mut r, Command::SelectCard { card_id: id }),
        Response::Selected { .. }
    ));
    assert_eq!(
        exchange(
            &mut r,
            Command::Authentication {
                block: 1,
                key: [0xFF; 6]
            }
        ),
        Response::Authenticated
    );
    assert!(matches!(
        exchange(&mut r, Command::ReadCard { block: 2 }),
        Response::Block(_)
    ));
}

#[test]
fn custom_retry_budget_is_honoured() {
    let emu = EmulatedReader::new();
    emu.set_silent_when_absent(true);
    let config = TerminalConfig::default()
        .with_reply_timeout(Duration::from_millis(100))
        .with_max_reply_retries(4);
    let mut r = reader_over(&emu, &config);
    let t0 = Instant::now();
    r.send(Command::search(), t0).unwrap();

    let mut result = Ok(());
    for i in 1..=5 {
        result = r.poll_timeout(t0 + Duration::from_millis(100 * i));
    }
    assert!(matches!(result, Err(Error::Timeout { command: 0x46 })));
    assert_eq!(emu.received_codes(), vec![0x46; 5]);
}

#[test]
fn late_reply_is_taken_before_deadline_retry() {
    let emu = EmulatedReader::new();
    let idx = emu.add_card(EmulatedCard::new(&common::uid(0x41)));
    emu.present_card(idx);
    emu.drop_next_replies(1);
    let mut r = reader_over(&emu, &TerminalConfig::default());
    let t0 = Instant::now();

    r.send(Command::search(), t0).unwrap();
    r.pump(t0).unwrap();
    assert!(r.next_reply(t0).is_none());

    let t1 = t0 + Duration::from_millis(400);
    r.poll_timeout(t1).unwrap();
    assert_eq!(r.pending().map(|p| p.retries()), Some(1));
    r.pump(t1).unwrap();
    let reply = r.next_reply(t1).unwrap();
    assert_eq!(reply.response().unwrap(), Response::CardFound);
}
