// parkgate/src/terminal/recharge.rs

use log::{debug, info};

use crate::card::TagRecord;
use crate::types::CardId;
use crate::{Error, Result};

use super::mode::{RechargeState, RechargeStep, RemovalReason, SessionMode};
use super::observer::InputRequest;
use super::Terminal;

impl Terminal {
    /// Operator-initiated recharge of the card on the reader, or a retry
    /// of a declined exit recharge.
    pub fn request_recharge(&mut self) -> Result<()> {
        let required_fee = match &self.mode {
            SessionMode::Idle => None,
            SessionMode::Recharging(RechargeState {
                required_fee,
                step: RechargeStep::Declined,
            }) => *required_fee,
            _ => return Err(Error::InvalidInput("another flow is active".into())),
        };
        if let Some(code) = self.reader.pending_code() {
            return Err(Error::Busy {
                pending: code.as_u8(),
            });
        }
        self.start_recharge(required_fee)
    }

    pub(super) fn start_recharge(&mut self, required_fee: Option<i32>) -> Result<()> {
        if !self.session.is_authenticated() {
            self.notify("Warning", "Authenticate first");
            self.recharge_unavailable(required_fee);
            return Err(Error::NotAuthenticated);
        }
        let (Some(card_id), Some(balance)) = (
            self.session.card_id().cloned(),
            self.session.record().map(|r| r.balance),
        ) else {
            self.notify("Recharge", "Card not registered, register before recharging");
            self.recharge_unavailable(required_fee);
            return Err(Error::RecordInvalid);
        };

        self.mode = SessionMode::Recharging(RechargeState {
            required_fee,
            step: RechargeStep::AwaitingInput,
        });
        if required_fee.is_none() {
            self.set_status("Recharging...");
        }
        self.observer.request_input(&InputRequest::Recharge {
            card_id,
            balance,
            required_fee,
        });
        Ok(())
    }

    /// Answer a recharge request with the amount to add. `None` cancels.
    pub fn submit_recharge(&mut self, amount: Option<i32>) -> Result<()> {
        let required_fee = match &self.mode {
            SessionMode::Recharging(RechargeState {
                required_fee,
                step: RechargeStep::AwaitingInput,
            }) => *required_fee,
            _ => return Err(Error::InvalidInput("no recharge pending".into())),
        };

        let Some(amount) = amount else {
            if required_fee.is_some() {
                self.mode = declined(required_fee);
                self.set_status("Please recharge before exit");
            } else {
                self.mode = SessionMode::Idle;
                self.set_status("Recharge cancelled");
            }
            return Ok(());
        };

        let (Some(card_id), Some(record)) =
            (self.session.card_id().cloned(), self.session.record().cloned())
        else {
            self.recharge_unavailable(required_fee);
            return Err(Error::RecordInvalid);
        };

        let expected = match self.recharged_record(&record, amount, required_fee) {
            Ok(expected) => expected,
            Err(e) => {
                self.notify("Recharge", &e.to_string());
                self.observer.request_input(&InputRequest::Recharge {
                    card_id,
                    balance: record.balance,
                    required_fee,
                });
                return Err(e);
            }
        };

        info!("recharging {}: {} -> {}", card_id, record.balance, expected.balance);
        self.mode = SessionMode::Recharging(RechargeState {
            required_fee,
            step: RechargeStep::Writing {
                expected: expected.clone(),
            },
        });
        self.set_status("Recharging...");
        self.start_write(expected, true);
        Ok(())
    }

    fn recharged_record(
        &self,
        record: &TagRecord,
        amount: i32,
        required_fee: Option<i32>,
    ) -> Result<TagRecord> {
        let max = self.config.max_balance;
        if !(1..=max).contains(&amount) {
            return Err(Error::InvalidInput(format!(
                "amount must be between 1 and {max}"
            )));
        }
        let balance = record
            .balance
            .checked_add(amount)
            .ok_or_else(|| Error::InvalidInput("balance overflow".into()))?;
        if let Some(fee) = required_fee {
            if balance < fee {
                return Err(Error::InvalidInput(format!(
                    "balance after recharge must cover the fee {fee}"
                )));
            }
        }
        Ok(record.with_balance(balance))
    }

    pub(super) fn finish_recharge(
        &mut self,
        card_id: &CardId,
        read: TagRecord,
        expected: TagRecord,
        required_fee: Option<i32>,
    ) {
        let visit = self.ledger.visit(card_id);
        self.observer
            .on_record_loaded(card_id, &read, visit.last_entry, visit.last_exit);
        if self.ledger.update_record(card_id, &read) {
            self.publish_table();
        }
        if read.balance != expected.balance {
            debug!("read back {} expected {}", read.balance, expected.balance);
            self.recharge_failed();
            return;
        }

        let balance = read.balance;
        self.notify("Recharge", &format!("Recharged, balance {balance}"));
        self.await_removal(card_id.clone(), RemovalReason::Recharged { balance });
        match required_fee {
            Some(fee) if balance < fee => self.mode = declined(required_fee),
            Some(_) => {
                // fee covered: carry on with the exit
                self.mode = SessionMode::Idle;
                self.resolve_parking(card_id, read);
            }
            None => self.mode = SessionMode::Idle,
        }
    }

    pub(super) fn recharge_failed(&mut self) {
        let required_fee = match &self.mode {
            SessionMode::Recharging(state) => state.required_fee,
            _ => None,
        };
        self.notify("Recharge", "Recharge failed, please retry");
        self.set_status("Please recharge again");
        self.recharge_unavailable(required_fee);
    }

    fn recharge_unavailable(&mut self, required_fee: Option<i32>) {
        self.mode = match required_fee {
            Some(_) => declined(required_fee),
            None => SessionMode::Idle,
        };
    }
}

fn declined(required_fee: Option<i32>) -> SessionMode {
    SessionMode::Recharging(RechargeState {
        required_fee,
        step: RechargeStep::Declined,
    })
}
