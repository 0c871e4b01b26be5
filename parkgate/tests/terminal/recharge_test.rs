#[path = "../common/mod.rs"]
mod common;

use std::time::Duration;

use common::{card_id, come_back, harness, park, uid, wait_for};
use parkgate::terminal::{InputRequest, RechargeState, RechargeStep, RemovalReason, SessionMode};
use parkgate::test_support::{registered_card, Event, Harness};
use parkgate::Error;

fn awaiting_recharge(mode: &SessionMode) -> bool {
    matches!(
        mode,
        SessionMode::Recharging(RechargeState {
            step: RechargeStep::AwaitingInput,
            ..
        })
    )
}

/// Park a card holding `balance`, bring it back after 130 s and wait for
/// the recharge prompt.
fn short_on_exit(balance: i32, tail: u8) -> (Harness, usize) {
    let mut h = harness();
    let idx = h
        .emulator
        .add_card(registered_card(&uid(tail), &common::fixtures::alice(balance)));
    let entered = park(&mut h, idx);
    come_back(&mut h, idx, entered, Duration::from_secs(130));
    wait_for(&mut h, "recharge prompt", |t| awaiting_recharge(t.mode()));
    (h, idx)
}

#[test]
fn insufficient_balance_recharges_then_exits() {
    let (mut h, idx) = short_on_exit(100, 0x20);
    assert_eq!(
        h.log.input_requests().last(),
        Some(&InputRequest::Recharge {
            card_id: card_id(0x20),
            balance: 100,
            required_fee: Some(130),
        })
    );
    assert!(h
        .log
        .notifications()
        .contains(&"Insufficient balance, minimum fee 130".to_string()));
    assert!(h.terminal.ledger().is_parked(&card_id(0x20)));

    h.terminal.submit_recharge(Some(50)).unwrap();
    wait_for(&mut h, "exit", |t| t.ledger().is_empty());

    assert_eq!(h.balance_on_card(idx), Some(20));
    assert!(h.log.events().contains(&Event::Exited {
        card_id: card_id(0x20),
        fee: 130,
        balance: 20,
    }));
    assert!(h
        .log
        .notifications()
        .contains(&"Recharged, balance 150".to_string()));
    assert_eq!(
        h.terminal.awaiting_removal().map(|w| w.reason.clone()),
        Some(RemovalReason::Exited { fee: 130 })
    );
}

#[test]
fn recharge_short_of_fee_is_asked_again() {
    let (mut h, _idx) = short_on_exit(100, 0x21);
    let err = h.terminal.submit_recharge(Some(20)).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(awaiting_recharge(h.terminal.mode()));
    assert_eq!(
        h.log
            .input_requests()
            .iter()
            .filter(|r| matches!(r, InputRequest::Recharge { .. }))
            .count(),
        2
    );

    assert!(matches!(
        h.terminal.submit_recharge(Some(0)),
        Err(Error::InvalidInput(_))
    ));
}

#[test]
fn declined_recharge_pauses_search_until_retried() {
    let (mut h, idx) = short_on_exit(100, 0x22);
    h.terminal.submit_recharge(None).unwrap();
    assert!(matches!(
        h.terminal.mode(),
        SessionMode::Recharging(RechargeState {
            required_fee: Some(130),
            step: RechargeStep::Declined,
        })
    ));
    assert_eq!(h.terminal.status(), "Please recharge before exit");

    h.emulator.clear_received();
    h.run_for(Duration::from_secs(2));
    assert!(h.emulator.received_codes().is_empty());
    assert!(h.terminal.ledger().is_parked(&card_id(0x22)));

    h.terminal.request_recharge().unwrap();
    assert!(awaiting_recharge(h.terminal.mode()));
    h.terminal.submit_recharge(Some(100)).unwrap();
    wait_for(&mut h, "exit", |t| t.ledger().is_empty());

    // the fee keeps running while the operator hesitates
    let fee = h
        .log
        .events()
        .iter()
        .find_map(|e| match e {
            Event::Exited { fee, .. } => Some(*fee),
            _ => None,
        })
        .unwrap();
    assert!(fee >= 132);
    assert_eq!(h.balance_on_card(idx), Some(200 - fee));
}

#[test]
fn abandoning_a_declined_recharge_resumes_search() {
    let (mut h, idx) = short_on_exit(100, 0x23);
    h.terminal.submit_recharge(None).unwrap();
    h.terminal.abandon_flow();
    assert!(h.terminal.mode().is_idle());
    assert!(h.terminal.search_active());
    assert_eq!(
        h.terminal.awaiting_removal().map(|w| w.reason.clone()),
        Some(RemovalReason::RechargeCancelled)
    );

    h.emulator.clear_received();
    h.run_for(Duration::from_secs(2));
    assert!(h.emulator.received_codes().contains(&0x46));
    // the card is still on the reader: no second recharge prompt
    let prompts = |h: &Harness| {
        h.log
            .input_requests()
            .iter()
            .filter(|r| matches!(r, InputRequest::Recharge { .. }))
            .count()
    };
    assert_eq!(prompts(&h), 1);
    assert!(h.terminal.mode().is_idle());
    assert_eq!(h.terminal.status(), "Recharge cancelled, please remove card");
    // the vehicle is still on the lot
    assert!(h.terminal.ledger().is_parked(&card_id(0x23)));

    // tapping again retries the exit
    h.remove_card();
    h.emulator.present_card(idx);
    wait_for(&mut h, "recharge prompt", |t| awaiting_recharge(t.mode()));
    assert_eq!(prompts(&h), 2);
}

#[test]
fn operator_recharge_without_fee() {
    let mut h = harness();
    let idx = h
        .emulator
        .add_card(registered_card(&uid(0x24), &common::fixtures::alice(10)));
    park(&mut h, idx);
    // let any in-flight cycle finish
    wait_for(&mut h, "idle channel", |t| !t.reader().is_busy());

    h.terminal.request_recharge().unwrap();
    assert_eq!(
        h.log.input_requests().last(),
        Some(&InputRequest::Recharge {
            card_id: card_id(0x24),
            balance: 10,
            required_fee: None,
        })
    );
    h.terminal.submit_recharge(Some(90)).unwrap();
    wait_for(&mut h, "recharge", |t| t.mode().is_idle());

    assert_eq!(h.balance_on_card(idx), Some(100));
    assert_eq!(
        h.terminal.awaiting_removal().map(|w| w.reason.clone()),
        Some(RemovalReason::Recharged { balance: 100 })
    );
    // parked row follows the new balance, no exit happened
    assert_eq!(h.log.last_table().unwrap()[0].balance, 100);
    assert_eq!(h.log.count(|e| matches!(e, Event::Exited { .. })), 0);
}

#[test]
fn recharge_cancel_without_fee_returns_to_idle() {
    let mut h = harness();
    let idx = h
        .emulator
        .add_card(registered_card(&uid(0x25), &common::fixtures::alice(10)));
    park(&mut h, idx);
    wait_for(&mut h, "idle channel", |t| !t.reader().is_busy());

    h.terminal.request_recharge().unwrap();
    h.terminal.submit_recharge(None).unwrap();
    assert!(h.terminal.mode().is_idle());
    assert_eq!(h.terminal.status(), "Recharge cancelled");
}

#[test]
fn recharge_needs_an_authenticated_card() {
    let mut h = harness();
    assert!(matches!(
        h.terminal.request_recharge(),
        Err(Error::NotAuthenticated)
    ));
    assert!(h.terminal.mode().is_idle());
    assert!(h
        .log
        .notifications()
        .contains(&"Authenticate first".to_string()));
}
