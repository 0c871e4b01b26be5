#[path = "../common/mod.rs"]
mod common;

use std::time::Duration;

use common::{card_id, come_back, harness, park, uid, wait_for};
use parkgate::terminal::RemovalReason;
use parkgate::test_support::{registered_card, Event, Harness};

#[test]
fn registered_card_enters_once() {
    let mut h = harness();
    let idx = h
        .emulator
        .add_card(registered_card(&uid(1), &common::fixtures::alice(100)));
    park(&mut h, idx);

    let rows = h.log.last_table().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].card_id, "aabbcc01");
    assert_eq!(rows[0].owner, "alice");
    assert_eq!(rows[0].balance, 100);
    assert_eq!(
        h.terminal.awaiting_removal().map(|w| w.reason.clone()),
        Some(RemovalReason::Entered)
    );

    // the card stays on the reader: later cycles only remind
    h.run_for(Duration::from_secs(3));
    assert_eq!(h.log.count(|e| matches!(e, Event::Entered(_))), 1);
    assert_eq!(h.log.count(|e| matches!(e, Event::Exited { .. })), 0);
    assert!(h.terminal.ledger().is_parked(&card_id(1)));
    assert_eq!(h.terminal.status(), "Entry complete, please remove card");
}

#[test]
fn exit_deducts_fee_from_card() {
    let mut h = harness();
    let idx = h
        .emulator
        .add_card(registered_card(&uid(2), &common::fixtures::alice(200)));
    let entered = park(&mut h, idx);
    come_back(&mut h, idx, entered, Duration::from_secs(130));

    wait_for(&mut h, "exit", |t| t.ledger().is_empty());
    assert_eq!(h.balance_on_card(idx), Some(70));
    assert!(h.log.events().contains(&Event::Exited {
        card_id: card_id(2),
        fee: 130,
        balance: 70,
    }));
    assert_eq!(h.log.last_table(), Some(vec![]));
    assert_eq!(
        h.terminal.awaiting_removal().map(|w| w.reason.clone()),
        Some(RemovalReason::Exited { fee: 130 })
    );
    assert!(h.terminal.mode().is_idle());
}

#[test]
fn removal_is_noticed_and_card_reenters() {
    let mut h = harness();
    let idx = h
        .emulator
        .add_card(registered_card(&uid(3), &common::fixtures::alice(500)));
    let entered = park(&mut h, idx);
    come_back(&mut h, idx, entered, Duration::from_secs(10));
    wait_for(&mut h, "exit", |t| t.ledger().is_empty());

    h.remove_card();
    assert!(h.terminal.awaiting_removal().is_none());
    park(&mut h, idx);
    assert_eq!(h.log.count(|e| matches!(e, Event::Entered(_))), 2);
    assert_eq!(h.balance_on_card(idx), Some(490));
}

#[test]
fn another_card_is_not_held_back() {
    let mut h = harness();
    let a = h
        .emulator
        .add_card(registered_card(&uid(4), &common::fixtures::alice(50)));
    let b = h
        .emulator
        .add_card(registered_card(&uid(5), &common::fixtures::alice(60)));
    park(&mut h, a);
    // swap cards without a gap
    park(&mut h, b);
    assert_eq!(h.terminal.ledger().len(), 2);
}

#[test]
fn blank_card_drops_stale_parking_entry() {
    let mut h = harness();
    let idx = h
        .emulator
        .add_card(registered_card(&uid(6), &common::fixtures::alice(80)));
    park(&mut h, idx);
    h.remove_card();

    h.emulator.clear_user_blocks(idx);
    h.emulator.present_card(idx);
    wait_for(&mut h, "registration request", |t| t.mode().awaiting_input());
    assert!(h.terminal.ledger().is_empty());
    assert_eq!(h.log.last_table(), Some(vec![]));
}

#[test]
fn duplicated_replies_do_not_repeat_the_flow() {
    let mut h = harness();
    let idx = h
        .emulator
        .add_card(registered_card(&uid(7), &common::fixtures::alice(100)));
    h.emulator.duplicate_next_replies(6);
    park(&mut h, idx);
    h.run_for(Duration::from_secs(1));

    assert_eq!(h.log.count(|e| matches!(e, Event::Entered(_))), 1);
    let rows = h.log.last_table().unwrap();
    assert_eq!(rows[0].balance, 100);
}

#[test]
fn hourly_rate_rounds_up() {
    use parkgate::parking::{FeePolicy, HourlyRate};

    let policy = HourlyRate::new(5);
    assert_eq!(policy.fee(Duration::from_secs(59)), 0);
    assert_eq!(policy.fee(Duration::from_secs(60)), 5);
    assert_eq!(policy.fee(Duration::from_secs(61 * 60)), 10);
}

#[test]
fn negative_fee_is_charged_as_zero() {
    common::init_logging();
    let mut h = Harness::with_fee_policy(|_parked: Duration| -50).unwrap();
    let idx = h
        .emulator
        .add_card(registered_card(&uid(9), &common::fixtures::alice(i32::MAX)));
    let entered = park(&mut h, idx);
    come_back(&mut h, idx, entered, Duration::from_secs(30));

    wait_for(&mut h, "exit", |t| t.ledger().is_empty());
    assert_eq!(h.balance_on_card(idx), Some(i32::MAX));
    assert!(h.log.events().contains(&Event::Exited {
        card_id: card_id(9),
        fee: 0,
        balance: i32::MAX,
    }));
}
