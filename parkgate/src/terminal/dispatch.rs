// parkgate/src/terminal/dispatch.rs

//! Card session state machine: one handler per reply, chaining the next
//! command by sending it, never by re-entering the receive path.

use log::{debug, info};

use crate::card::{PendingWrite, TagRecord, WriteStep};
use crate::protocol::{Command, Response};
use crate::reader::Reply;
use crate::types::{BlockData, CommandCode};
use crate::Error;

use super::mode::{ParkingState, RechargeState, RechargeStep, RegistrationState, SessionMode};
use super::Terminal;

impl Terminal {
    pub(super) fn dispatch(&mut self, reply: Reply) {
        let code = reply.code();
        match reply.response() {
            Ok(response) => self.on_response(&reply.request, response),
            Err(e) => {
                debug!("{} failed: {}", code, e);
                self.on_command_failed(code, &e);
            }
        }
    }

    pub(super) fn on_timeout(&mut self, command: u8) {
        match CommandCode::try_from(command) {
            Ok(code) => self.on_command_failed(code, &Error::Timeout { command }),
            Err(e) => debug!("timeout for {}", e),
        }
    }

    fn on_response(&mut self, request: &Command, response: Response) {
        match response {
            Response::CardFound => self.send(Command::anticoll()),
            Response::AntiColl { card_id } => {
                debug!("anticoll: card {}", card_id);
                self.session.set_card(card_id.clone());
                self.send(Command::SelectCard { card_id });
            }
            Response::Selected { kind } => {
                debug!("selected {}", kind);
                self.session.set_kind(kind);
                self.send(Command::Authentication {
                    block: self.config.owner_block,
                    key: self.config.auth_key,
                });
            }
            Response::Authenticated => {
                self.session.set_authenticated(true);
                self.request_read(self.config.owner_block);
            }
            Response::Block(data) => self.on_block(request.block(), data),
            Response::Written => self.on_written(),
        }
    }

    fn request_read(&mut self, block: u8) {
        self.session.set_pending_read(Some(block));
        self.send(Command::ReadCard { block });
    }

    fn on_block(&mut self, block: Option<u8>, data: BlockData) {
        self.session.set_pending_read(None);
        if block == Some(self.config.owner_block) {
            self.session.cache_owner_block(data);
            self.request_read(self.config.balance_block);
        } else if block == Some(self.config.balance_block) {
            self.session.cache_balance_block(data);
            self.on_record_read();
        } else {
            debug!("ignoring block {:?}", block);
        }
    }

    /// Both user blocks are cached: decide what the card means.
    fn on_record_read(&mut self) {
        let Some(card_id) = self.session.card_id().cloned() else {
            return;
        };
        let mode = self.mode.clone();
        match (self.session.validate(), mode) {
            (Ok(read), SessionMode::Registering(RegistrationState::Verifying { record })) => {
                self.finish_registration(&card_id, read, record)
            }
            (
                Ok(read),
                SessionMode::Recharging(RechargeState {
                    required_fee,
                    step: RechargeStep::Verifying { expected },
                }),
            ) => self.finish_recharge(&card_id, read, expected, required_fee),
            (Ok(read), SessionMode::Idle) => self.handle_parking_flow(&card_id, read),
            (Err(_), SessionMode::Registering(RegistrationState::Verifying { .. })) => {
                self.registration_verify_failed()
            }
            (
                Err(_),
                SessionMode::Recharging(RechargeState {
                    step: RechargeStep::Verifying { .. },
                    ..
                }),
            ) => self.recharge_failed(),
            (Err(_), SessionMode::Idle) => self.handle_invalid_card(&card_id),
            (_, mode) => debug!("record read while {:?}", mode),
        }
    }

    /// Queue `record` for writing, block 1 then block 2.
    pub(super) fn start_write(&mut self, record: TagRecord, read_back: bool) {
        if !self.session.is_authenticated() {
            self.notify("Warning", "Authenticate first");
            self.on_write_failed();
            return;
        }
        let write = PendingWrite::new(record, read_back);
        if self.reader.is_busy() {
            self.queued_write = Some(write);
            self.set_status("Waiting for current operation...");
            return;
        }
        self.session.set_pending_write(Some(write));
        self.send_pending_write();
    }

    pub(super) fn send_pending_write(&mut self) {
        let Some(write) = self.session.pending_write() else {
            return;
        };
        let (block, data) = match write.step {
            WriteStep::Owner => (self.config.owner_block, write.owner_block),
            WriteStep::Balance => (self.config.balance_block, write.balance_block),
        };
        self.send(Command::WriteCard { block, data });
    }

    fn on_written(&mut self) {
        let Some(write) = self.session.pending_write_mut() else {
            debug!("write ack without a pending write");
            return;
        };
        if write.step == WriteStep::Owner {
            write.step = WriteStep::Balance;
            self.send_pending_write();
            return;
        }

        let Some(write) = self.session.take_pending_write() else {
            return;
        };
        self.session.commit_write(&write);
        if write.read_back {
            self.begin_verification();
            self.request_read(self.config.owner_block);
        } else {
            self.on_write_committed(&write.record);
        }
    }

    fn begin_verification(&mut self) {
        self.mode = match std::mem::take(&mut self.mode) {
            SessionMode::Registering(RegistrationState::Writing { record }) => {
                SessionMode::Registering(RegistrationState::Verifying { record })
            }
            SessionMode::Recharging(RechargeState {
                required_fee,
                step: RechargeStep::Writing { expected },
            }) => SessionMode::Recharging(RechargeState {
                required_fee,
                step: RechargeStep::Verifying { expected },
            }),
            other => other,
        };
    }

    fn on_write_committed(&mut self, record: &TagRecord) {
        if matches!(self.mode, SessionMode::Parking(ParkingState::Exiting { .. })) {
            self.finish_exit();
            return;
        }
        if let Some(card_id) = self.session.card_id().cloned() {
            if self.ledger.update_record(&card_id, record) {
                self.publish_table();
            }
        }
    }

    /// A command failed: bad status, empty payload, timeout or a refused
    /// send. Each command has its own recovery.
    pub(super) fn on_command_failed(&mut self, code: CommandCode, err: &Error) {
        match code {
            CommandCode::SearchCard => {
                self.session.clear();
                if let Some(waiting) = self.awaiting_removal.take() {
                    info!("card {} removed", waiting.card_id);
                    self.set_status("");
                }
            }
            CommandCode::AntiColl | CommandCode::SelectCard => {
                debug!("{} failed ({}), card not identified", code, err);
                self.session.clear();
            }
            CommandCode::Authentication => {
                info!("authentication failed: {}", err);
                self.session.clear();
                self.set_status("Authentication failed, please re-tap card");
            }
            CommandCode::ReadCard => {
                self.session.set_pending_read(None);
                self.on_read_failed();
            }
            CommandCode::WriteCard => {
                self.session.set_pending_write(None);
                self.on_write_failed();
            }
        }
    }

    fn on_read_failed(&mut self) {
        match self.mode.clone() {
            SessionMode::Registering(RegistrationState::Verifying { .. }) => {
                self.registration_verify_failed()
            }
            SessionMode::Recharging(RechargeState {
                step: RechargeStep::Verifying { .. },
                ..
            }) => self.recharge_failed(),
            SessionMode::Idle => {
                let Some(card_id) = self.session.card_id().cloned() else {
                    return;
                };
                let (title, message) = if self.ledger.is_parked(&card_id) {
                    ("Exit", "Exit failed, please re-tap card")
                } else {
                    ("Entry", "Entry failed, please re-tap card")
                };
                self.set_status(message);
                self.notify(title, message);
            }
            other => debug!("read failed while {:?}", other),
        }
    }

    fn on_write_failed(&mut self) {
        match self.mode.clone() {
            SessionMode::Registering(_) => {
                self.mode = SessionMode::Idle;
                self.set_status("Registration failed, please re-tap card");
                self.notify("Registration", "Registration failed, please re-tap card");
            }
            SessionMode::Recharging(_) => self.recharge_failed(),
            SessionMode::Parking(ParkingState::Exiting { .. }) => {
                // nothing was committed: the card stays parked
                self.mode = SessionMode::Idle;
                self.set_status("Exit failed, please re-tap card");
                self.notify("Exit", "Exit failed, please re-tap card");
            }
            SessionMode::Idle => {}
        }
    }
}
