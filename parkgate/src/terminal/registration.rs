// parkgate/src/terminal/registration.rs

use log::info;

use crate::card::TagRecord;
use crate::constants::OWNER_NAME_LEN;
use crate::types::CardId;
use crate::{Error, Result};

use super::mode::{RegistrationState, RemovalReason, SessionMode};
use super::observer::{InputRequest, RegistrationForm};
use super::Terminal;

const DEFAULT_OWNER: &str = "Unknown";

impl Terminal {
    pub(super) fn begin_registration(&mut self, card_id: &CardId) {
        self.mode = SessionMode::Registering(RegistrationState::AwaitingInput);
        self.observer.request_input(&InputRequest::Registration {
            card_id: card_id.clone(),
        });
    }

    /// Answer a registration request. `None` cancels.
    ///
    /// Invalid input is reported through `notify_user`, the request is
    /// issued again and the flow keeps waiting.
    pub fn submit_registration(&mut self, form: Option<RegistrationForm>) -> Result<()> {
        if self.mode != SessionMode::Registering(RegistrationState::AwaitingInput) {
            return Err(Error::InvalidInput("no registration pending".into()));
        }
        let Some(card_id) = self.session.card_id().cloned() else {
            self.mode = SessionMode::Idle;
            return Err(Error::NotAuthenticated);
        };

        let Some(form) = form else {
            self.mode = SessionMode::Idle;
            self.notify("Registration", "Registration cancelled");
            self.await_removal(card_id, RemovalReason::RegistrationCancelled);
            return Ok(());
        };

        let record = match self.registration_record(form) {
            Ok(record) => record,
            Err(e) => {
                self.notify("Registration", &e.to_string());
                self.observer
                    .request_input(&InputRequest::Registration { card_id });
                return Err(e);
            }
        };

        info!("registering {}: {}", card_id, record);
        self.mode = SessionMode::Registering(RegistrationState::Writing {
            record: record.clone(),
        });
        self.set_status("Registering...");
        self.start_write(record, true);
        Ok(())
    }

    /// Normalise the form into what will read back from the card.
    fn registration_record(&self, form: RegistrationForm) -> Result<TagRecord> {
        let max = self.config.max_balance;
        if !(0..=max).contains(&form.balance) {
            return Err(Error::InvalidInput(format!(
                "initial balance must be between 0 and {max}"
            )));
        }
        let owner: String = form
            .owner
            .trim()
            .chars()
            .map(|c| if u32::from(c) <= 0xFF && c != '\0' { c } else { '?' })
            .take(OWNER_NAME_LEN)
            .collect();
        let owner = match owner.trim_end() {
            "" => DEFAULT_OWNER.to_string(),
            trimmed => trimmed.to_string(),
        };
        Ok(TagRecord::new(owner, form.vehicle, form.balance))
    }

    pub(super) fn finish_registration(
        &mut self,
        card_id: &CardId,
        read: TagRecord,
        expected: TagRecord,
    ) {
        if read != expected {
            self.registration_verify_failed();
            return;
        }
        self.mode = SessionMode::Idle;
        let visit = self.ledger.visit(card_id);
        self.observer
            .on_record_loaded(card_id, &read, visit.last_entry, visit.last_exit);
        self.notify("Registration", "Registered, please remove card");
        self.await_removal(card_id.clone(), RemovalReason::Registered);
    }

    pub(super) fn registration_verify_failed(&mut self) {
        self.mode = SessionMode::Idle;
        self.set_status("Write failed, please re-tap card");
        self.notify("Registration", "Write failed, please re-tap card");
    }
}
