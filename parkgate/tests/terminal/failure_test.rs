#[path = "../common/mod.rs"]
mod common;

use std::time::Duration;

use common::{card_id, come_back, harness, park, uid, wait_for};
use parkgate::terminal::{RegistrationForm, RemovalReason, SessionMode};
use parkgate::test_support::{blank_card, registered_card, Event};
use parkgate::transport::EmulatedCard;
use parkgate::{CommandCode, VehicleType};

#[test]
fn failed_exit_write_keeps_vehicle_parked() {
    let mut h = harness();
    let idx = h
        .emulator
        .add_card(registered_card(&uid(0x30), &common::fixtures::alice(200)));
    let entered = park(&mut h, idx);
    h.emulator.fail_next(CommandCode::WriteCard, 1, 0x01);
    come_back(&mut h, idx, entered, Duration::from_secs(130));

    wait_for(&mut h, "exit failure", |t| {
        t.status() == "Exit failed, please re-tap card"
    });
    assert!(h.terminal.ledger().is_parked(&card_id(0x30)));
    assert_eq!(h.balance_on_card(idx), Some(200));
    assert!(h.terminal.mode().is_idle());
    assert_eq!(h.log.count(|e| matches!(e, Event::Exited { .. })), 0);

    // the card is still on the reader: the next cycle retries the exit
    wait_for(&mut h, "exit", |t| t.ledger().is_empty());
    let fee = h
        .log
        .events()
        .iter()
        .find_map(|e| match e {
            Event::Exited { fee, .. } => Some(*fee),
            _ => None,
        })
        .unwrap();
    assert_eq!(h.balance_on_card(idx), Some(200 - fee));
}

#[test]
fn lost_reply_is_recovered_by_retransmission() {
    let mut h = harness();
    let idx = h
        .emulator
        .add_card(registered_card(&uid(0x31), &common::fixtures::alice(5)));
    h.emulator.drop_next_replies(1);
    park(&mut h, idx);

    let codes = h.emulator.received_codes();
    assert_eq!(&codes[..3], &[0x46, 0x46, 0x47]);
    assert_eq!(h.log.count(|e| matches!(e, Event::Entered(_))), 1);
}

#[test]
fn silent_reader_gives_up_after_two_retries() {
    let mut h = harness();
    let idx = h
        .emulator
        .add_card(registered_card(&uid(0x32), &common::fixtures::alice(5)));
    h.emulator.drop_next_commands(3);
    park(&mut h, idx);

    // three identical transmissions, a timeout, then a fresh search
    let codes = h.emulator.received_codes();
    assert_eq!(&codes[..5], &[0x46, 0x46, 0x46, 0x46, 0x47]);
    let first = h.emulator.received()[0].to_raw();
    assert!(h.emulator.received()[..4]
        .iter()
        .all(|p| p.to_raw() == first));
}

#[test]
fn wrong_key_reports_authentication_failure() {
    let mut h = harness();
    h.present(EmulatedCard::new(&uid(0x33)).with_key([0x00; 6]));
    wait_for(&mut h, "auth failure", |t| {
        t.status() == "Authentication failed, please re-tap card"
    });
    h.run_for(Duration::from_secs(1));
    assert!(h.terminal.ledger().is_empty());
    assert!(h.log.input_requests().is_empty());
    assert!(!h.terminal.session().is_authenticated());
}

#[test]
fn registration_write_timeout_returns_to_idle() {
    let mut h = harness();
    h.present(blank_card(&uid(0x34)));
    wait_for(&mut h, "registration request", |t| t.mode().awaiting_input());

    h.emulator.clear_received();
    h.emulator.drop_next_commands(3);
    h.terminal
        .submit_registration(Some(RegistrationForm::new("zoe", VehicleType::Sedan, 1)))
        .unwrap();
    wait_for(&mut h, "write timeout", |t| t.mode().is_idle());

    assert_eq!(&h.emulator.received_codes()[..3], &[0x4C, 0x4C, 0x4C]);
    assert_eq!(h.terminal.status(), "Registration failed, please re-tap card");
    assert!(h.emulator.block(0, 1).unwrap().as_bytes().iter().all(|&b| b == 0));
}

#[test]
fn abandon_returns_to_search() {
    let mut h = harness();
    h.present(blank_card(&uid(0x35)));
    wait_for(&mut h, "registration request", |t| t.mode().awaiting_input());
    h.terminal.abandon_flow();
    assert_eq!(h.terminal.mode(), &SessionMode::Idle);
    assert!(h.terminal.search_active());
    assert_eq!(
        h.terminal.awaiting_removal().map(|w| w.reason.clone()),
        Some(RemovalReason::RegistrationCancelled)
    );

    // the blank card stays on the reader without a second prompt
    h.run_for(Duration::from_secs(2));
    assert_eq!(h.log.input_requests().len(), 1);
    assert!(h.terminal.mode().is_idle());

    h.remove_card();
    h.emulator.present_card(0);
    wait_for(&mut h, "registration request", |t| t.mode().awaiting_input());
    assert_eq!(h.log.input_requests().len(), 2);
}

#[test]
fn stop_settles_the_command_in_flight() {
    let mut h = harness();
    h.present(blank_card(&uid(0x36)));
    h.step();
    assert!(h.terminal.reader().is_busy());

    h.terminal.stop();
    assert!(!h.terminal.is_running());
    assert!(!h.terminal.reader().is_busy());
    assert!(h.terminal.session().card_id().is_none());

    h.terminal.start().unwrap();
    wait_for(&mut h, "registration request", |t| t.mode().awaiting_input());
}
