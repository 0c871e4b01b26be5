// parkgate/src/test_support.rs

//! Test support helpers intended for use by unit and integration tests.
//!
//! These helpers centralize the emulator/clock/observer wiring so tests
//! across the crate and the tests/ directory drive a terminal the same way.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, SystemTime};

use crate::card::TagRecord;
use crate::config::TerminalConfig;
use crate::parking::{ElapsedSeconds, FeePolicy, ParkingRow};
use crate::terminal::{InputRequest, Terminal, TerminalObserver};
use crate::transport::{EmulatedCard, EmulatedReader};
use crate::types::{BlockData, CardId, VehicleType};
use crate::utils::ManualClock;
use crate::Result;

/// Everything the terminal reported, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Entered(CardId),
    Exited { card_id: CardId, fee: i32, balance: i32 },
    Status(String),
    Table(Vec<ParkingRow>),
    Record(CardId, TagRecord),
    Notify(String, String),
    Input(InputRequest),
}

/// Recording observer. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<Event>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    pub fn input_requests(&self) -> Vec<InputRequest> {
        self.filter(|e| match e {
            Event::Input(r) => Some(r.clone()),
            _ => None,
        })
    }

    pub fn notifications(&self) -> Vec<String> {
        self.filter(|e| match e {
            Event::Notify(_, m) => Some(m.clone()),
            _ => None,
        })
    }

    pub fn statuses(&self) -> Vec<String> {
        self.filter(|e| match e {
            Event::Status(s) => Some(s.clone()),
            _ => None,
        })
    }

    pub fn last_table(&self) -> Option<Vec<ParkingRow>> {
        self.filter(|e| match e {
            Event::Table(rows) => Some(rows.clone()),
            _ => None,
        })
        .pop()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| pred(e)).count()
    }

    fn filter<T>(&self, f: impl Fn(&Event) -> Option<T>) -> Vec<T> {
        self.events.borrow().iter().filter_map(f).collect()
    }

    fn push(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }
}

impl TerminalObserver for EventLog {
    fn on_card_entered(&mut self, card_id: &CardId, _record: &TagRecord) {
        self.push(Event::Entered(card_id.clone()));
    }

    fn on_card_exited(&mut self, card_id: &CardId, record: &TagRecord, fee: i32) {
        self.push(Event::Exited {
            card_id: card_id.clone(),
            fee,
            balance: record.balance,
        });
    }

    fn on_status_changed(&mut self, text: &str) {
        self.push(Event::Status(text.to_string()));
    }

    fn on_parking_table_changed(&mut self, rows: &[ParkingRow]) {
        self.push(Event::Table(rows.to_vec()));
    }

    fn on_record_loaded(
        &mut self,
        card_id: &CardId,
        record: &TagRecord,
        _entered_at: Option<SystemTime>,
        _exited_at: Option<SystemTime>,
    ) {
        self.push(Event::Record(card_id.clone(), record.clone()));
    }

    fn notify_user(&mut self, title: &str, message: &str) {
        self.push(Event::Notify(title.to_string(), message.to_string()));
    }

    fn request_input(&mut self, request: &InputRequest) {
        self.push(Event::Input(request.clone()));
    }
}

/// Poll period used by the harness; small so a full card cycle costs
/// well under a second of simulated time.
pub const HARNESS_POLL_MS: u64 = 10;

/// Terminal over an emulated reader, with handles to drive both.
pub struct Harness {
    pub terminal: Terminal,
    pub emulator: EmulatedReader,
    pub clock: ManualClock,
    pub log: EventLog,
}

impl Harness {
    /// Started terminal with the default fee policy (one unit per second).
    pub fn new() -> Result<Self> {
        Self::with_config(harness_config())
    }

    pub fn with_config(config: TerminalConfig) -> Result<Self> {
        Self::build(config, ElapsedSeconds)
    }

    /// Harness timing with a custom fee policy.
    pub fn with_fee_policy(policy: impl FeePolicy + 'static) -> Result<Self> {
        Self::build(harness_config(), policy)
    }

    fn build(config: TerminalConfig, policy: impl FeePolicy + 'static) -> Result<Self> {
        let emulator = EmulatedReader::new();
        let clock = ManualClock::new();
        let log = EventLog::new();
        let mut terminal = Terminal::builder(Box::new(emulator.clone()))
            .config(config)
            .clock(clock.clone())
            .observer(log.clone())
            .fee_policy(policy)
            .build();
        terminal.start()?;
        Ok(Self {
            terminal,
            emulator,
            clock,
            log,
        })
    }

    /// Advance the clock one poll period and tick.
    pub fn step(&mut self) {
        self.clock.advance(Duration::from_millis(HARNESS_POLL_MS));
        self.terminal.tick();
    }

    pub fn run_for(&mut self, duration: Duration) {
        let steps = duration.as_millis() / u128::from(HARNESS_POLL_MS);
        for _ in 0..steps.max(1) {
            self.step();
        }
    }

    /// Step until `done` holds, at most `max` simulated time.
    pub fn run_until(&mut self, max: Duration, done: impl Fn(&Terminal) -> bool) -> bool {
        let steps = max.as_millis() / u128::from(HARNESS_POLL_MS);
        for _ in 0..steps {
            if done(&self.terminal) {
                return true;
            }
            self.step();
        }
        done(&self.terminal)
    }

    /// Step until no command is in flight and the terminal is waiting on
    /// the operator or idle with the card dealt with.
    pub fn settle(&mut self) {
        self.run_for(Duration::from_millis(300));
    }

    /// Jump the clock without running any timer in between.
    pub fn skip(&mut self, by: Duration) {
        self.clock.advance(by);
    }

    pub fn present(&mut self, card: EmulatedCard) -> usize {
        let idx = self.emulator.add_card(card);
        self.emulator.present_card(idx);
        idx
    }

    pub fn remove_card(&mut self) {
        self.emulator.remove_card();
        // let a search fail so the removal is noticed
        self.run_for(Duration::from_millis(600));
    }

    pub fn balance_on_card(&self, index: usize) -> Option<i32> {
        let b1 = self.emulator.block(index, self.terminal.config().owner_block)?;
        let b2 = self.emulator.block(index, self.terminal.config().balance_block)?;
        TagRecord::decode(&b1, &b2).ok().map(|r| r.balance)
    }
}

pub fn harness_config() -> TerminalConfig {
    TerminalConfig::default().with_poll_interval(Duration::from_millis(HARNESS_POLL_MS))
}

pub const SAMPLE_UID: [u8; 4] = [0xAA, 0xBB, 0xCC, 0xDD];

/// Card with no record in its user blocks.
pub fn blank_card(uid: &[u8]) -> EmulatedCard {
    EmulatedCard::new(uid)
}

/// Card already carrying `record` in blocks 1 and 2.
pub fn registered_card(uid: &[u8], record: &TagRecord) -> EmulatedCard {
    let (b1, b2) = record.encode();
    EmulatedCard::new(uid).with_block(1, b1).with_block(2, b2)
}

pub fn sample_record(balance: i32) -> TagRecord {
    TagRecord::new("alice", VehicleType::Sedan, balance)
}

/// Block 1 that fails the signature check.
pub fn garbage_block() -> BlockData {
    BlockData::from_bytes([0x5A; 16])
}
