// parkgate/src/terminal/mod.rs

//! Parking terminal: drives the card session over a `Reader` and runs the
//! entry/exit, registration and recharge flows on top of it.
//!
//! Everything happens on the caller's thread. The host calls [`Terminal::tick`]
//! (or the three timer handlers directly) and answers input requests with
//! the `submit_*` methods.

mod dispatch;
pub mod mode;
pub mod observer;
mod parking;
mod recharge;
mod registration;

pub use mode::{
    AwaitingRemoval, ParkingState, RechargeState, RechargeStep, RegistrationState, RemovalReason,
    SessionMode,
};
pub use observer::{InputRequest, RegistrationForm, TerminalObserver};

use std::time::Instant;

use log::{info, warn};

use crate::card::{CardSession, PendingWrite};
use crate::config::TerminalConfig;
use crate::parking::{ElapsedSeconds, FeePolicy, ParkingLedger};
use crate::protocol::Command;
use crate::reader::Reader;
use crate::transport::Transport;
use crate::utils::{Clock, SystemClock};
use crate::{Error, Result};

pub struct Terminal {
    config: TerminalConfig,
    reader: Reader,
    clock: Box<dyn Clock>,
    observer: Box<dyn TerminalObserver>,
    fee_policy: Box<dyn FeePolicy>,
    session: CardSession,
    mode: SessionMode,
    ledger: ParkingLedger,
    awaiting_removal: Option<AwaitingRemoval>,
    /// Write requested while the channel was busy.
    queued_write: Option<PendingWrite>,
    abandon_requested: bool,
    running: bool,
    next_poll: Option<Instant>,
    next_search: Option<Instant>,
    status: String,
}

impl std::fmt::Debug for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Terminal")
            .field("running", &self.running)
            .field("mode", &self.mode)
            .field("reader", &self.reader)
            .field("parked", &self.ledger.len())
            .finish()
    }
}

impl Terminal {
    pub fn new(
        config: TerminalConfig,
        transport: Box<dyn Transport>,
        clock: Box<dyn Clock>,
        observer: Box<dyn TerminalObserver>,
        fee_policy: Box<dyn FeePolicy>,
    ) -> Self {
        let reader = Reader::new(transport, &config);
        Self {
            config,
            reader,
            clock,
            observer,
            fee_policy,
            session: CardSession::new(),
            mode: SessionMode::Idle,
            ledger: ParkingLedger::new(),
            awaiting_removal: None,
            queued_write: None,
            abandon_requested: false,
            running: false,
            next_poll: None,
            next_search: None,
            status: String::new(),
        }
    }

    pub fn builder(transport: Box<dyn Transport>) -> TerminalBuilder {
        TerminalBuilder::new(transport)
    }

    /// Open the port and start the search loop.
    pub fn start(&mut self) -> Result<()> {
        if self.running {
            return Err(Error::AlreadyOpen);
        }
        self.reader.open(&self.config.port)?;
        let now = self.clock.now();
        self.running = true;
        self.next_poll = Some(now + self.config.poll_interval);
        self.next_search = Some(now);
        info!("terminal started on '{}'", self.config.port.port_name);
        Ok(())
    }

    /// Close the port and drop whatever was in flight. Flows and the
    /// ledger survive; `reset` clears those.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        // settle the flow waiting on the in-flight command
        if let Some(code) = self.reader.pending_code() {
            self.on_command_failed(code, &Error::NotOpen);
        }
        self.reader.close();
        self.session.set_pending_read(None);
        self.session.set_pending_write(None);
        self.queued_write = None;
        self.running = false;
        self.next_poll = None;
        self.next_search = None;
        info!("terminal stopped");
    }

    /// Back to the power-on state: no card, no flow, empty ledger.
    pub fn reset(&mut self) {
        self.reader.clear();
        self.session.clear();
        self.mode = SessionMode::Idle;
        self.ledger.clear();
        self.awaiting_removal = None;
        self.queued_write = None;
        self.abandon_requested = false;
        self.status.clear();
        let rows = self.ledger.rows();
        self.observer.on_parking_table_changed(&rows);
        info!("terminal reset");
    }

    /// Run whichever timer events are due.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }
        let now = self.clock.now();
        if self.next_poll.is_some_and(|t| now >= t) {
            self.poll_transport();
            self.next_poll = Some(now + self.config.poll_interval);
        }
        self.check_reply_timeout();
        if self.next_search.is_some_and(|t| now >= t) {
            self.auto_search();
            self.next_search = Some(now + self.config.auto_search_interval);
        }
    }

    /// Pull bytes from the port and handle every reply they complete,
    /// one at a time.
    pub fn poll_transport(&mut self) {
        if !self.reader.is_open() {
            return;
        }
        let now = self.clock.now();
        if let Err(e) = self.reader.pump(now) {
            warn!("read failed: {}", e);
            return;
        }
        while let Some(reply) = self.reader.next_reply(now) {
            self.dispatch(reply);
            self.after_exchange();
        }
    }

    /// Retransmit or give up on the in-flight command.
    pub fn check_reply_timeout(&mut self) {
        let now = self.clock.now();
        if let Err(Error::Timeout { command }) = self.reader.poll_timeout(now) {
            self.on_timeout(command);
            self.after_exchange();
        }
    }

    /// Issue a SearchCard if the terminal is idle and the channel free.
    pub fn auto_search(&mut self) {
        if !self.reader.is_open() || !self.mode.is_idle() || self.reader.is_busy() {
            return;
        }
        self.send(Command::search());
    }

    /// Return a registration or recharge flow to idle. Deferred while a
    /// command is in flight.
    pub fn abandon_flow(&mut self) {
        if self.reader.is_busy() {
            self.abandon_requested = true;
            return;
        }
        self.apply_abandon();
    }

    fn apply_abandon(&mut self) {
        self.abandon_requested = false;
        let (status, reason) = match &self.mode {
            SessionMode::Registering(_) => {
                ("Registration cancelled", RemovalReason::RegistrationCancelled)
            }
            SessionMode::Recharging(_) => ("Recharge cancelled", RemovalReason::RechargeCancelled),
            SessionMode::Parking(_) | SessionMode::Idle => return,
        };
        self.session.set_pending_write(None);
        self.queued_write = None;
        self.mode = SessionMode::Idle;
        info!("{}", status);
        // a card left on the reader must not reopen the flow
        match self.session.card_id().cloned() {
            Some(card_id) => self.await_removal(card_id, reason),
            None => self.set_status(status),
        }
    }

    /// Flush work that waited for the channel to free.
    fn after_exchange(&mut self) {
        if self.reader.is_busy() {
            return;
        }
        if self.abandon_requested {
            self.apply_abandon();
        }
        if let Some(write) = self.queued_write.take() {
            self.session.set_pending_write(Some(write));
            self.send_pending_write();
        }
    }

    fn send(&mut self, cmd: Command) {
        let now = self.clock.now();
        let code = cmd.command_code();
        if let Err(e) = self.reader.send(cmd, now) {
            warn!("send 0x{:02x} failed: {}", code.as_u8(), e);
            self.on_command_failed(code, &e);
        }
    }

    fn set_status(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.status {
            self.status = text;
            self.observer.on_status_changed(&self.status);
        }
    }

    fn notify(&mut self, title: &str, message: &str) {
        info!("{}: {}", title, message);
        self.observer.notify_user(title, message);
    }

    fn publish_table(&mut self) {
        let rows = self.ledger.rows();
        self.observer.on_parking_table_changed(&rows);
    }

    pub fn config(&self) -> &TerminalConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn mode(&self) -> &SessionMode {
        &self.mode
    }

    pub fn session(&self) -> &CardSession {
        &self.session
    }

    pub fn ledger(&self) -> &ParkingLedger {
        &self.ledger
    }

    pub fn reader(&self) -> &Reader {
        &self.reader
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn awaiting_removal(&self) -> Option<&AwaitingRemoval> {
        self.awaiting_removal.as_ref()
    }

    /// Whether the search loop would fire on its next interval.
    pub fn search_active(&self) -> bool {
        self.running && self.mode.is_idle()
    }
}

/// Helper to construct a Terminal with optional collaborators.
pub struct TerminalBuilder {
    transport: Box<dyn Transport>,
    config: TerminalConfig,
    clock: Option<Box<dyn Clock>>,
    observer: Option<Box<dyn TerminalObserver>>,
    fee_policy: Option<Box<dyn FeePolicy>>,
}

impl TerminalBuilder {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            config: TerminalConfig::default(),
            clock: None,
            observer: None,
            fee_policy: None,
        }
    }

    pub fn config(mut self, config: TerminalConfig) -> Self {
        self.config = config;
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn observer(mut self, observer: impl TerminalObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn fee_policy(mut self, policy: impl FeePolicy + 'static) -> Self {
        self.fee_policy = Some(Box::new(policy));
        self
    }

    /// Defaults: system clock, no observer, one unit per second parked.
    pub fn build(self) -> Terminal {
        Terminal::new(
            self.config,
            self.transport,
            self.clock.unwrap_or_else(|| Box::new(SystemClock)),
            self.observer.unwrap_or_else(|| Box::new(())),
            self.fee_policy.unwrap_or_else(|| Box::new(ElapsedSeconds)),
        )
    }
}
