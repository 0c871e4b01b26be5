// parkgate/src/terminal/parking.rs

//! Entry and exit decisions for a card with a valid record.

use std::time::SystemTime;

use log::{debug, info};

use crate::card::TagRecord;
use crate::types::CardId;

use super::mode::{AwaitingRemoval, ParkingState, RemovalReason, SessionMode};
use super::Terminal;

impl Terminal {
    pub(super) fn handle_parking_flow(&mut self, card_id: &CardId, record: TagRecord) {
        if self.holds_for_removal(card_id) {
            return;
        }
        self.awaiting_removal = None;

        let visit = self.ledger.visit(card_id);
        self.observer
            .on_record_loaded(card_id, &record, visit.last_entry, visit.last_exit);
        if self.ledger.update_record(card_id, &record) {
            self.publish_table();
        }
        self.resolve_parking(card_id, record);
    }

    /// A card that stayed on the reader after its flow finished is only
    /// reminded to leave.
    pub(super) fn holds_for_removal(&mut self, card_id: &CardId) -> bool {
        let status = match &self.awaiting_removal {
            Some(waiting) if &waiting.card_id == card_id => waiting.reason.status(),
            _ => return false,
        };
        self.set_status(status);
        true
    }

    /// Parked cards exit, everything else enters.
    pub(super) fn resolve_parking(&mut self, card_id: &CardId, record: TagRecord) {
        let now = self.clock.wall();
        match self.ledger.get(card_id).map(|p| p.entered_at) {
            Some(entered_at) => self.begin_exit(record, entered_at, now),
            None => self.complete_entry(card_id, record, now),
        }
    }

    fn complete_entry(&mut self, card_id: &CardId, record: TagRecord, now: SystemTime) {
        info!("entry: {} {}", card_id, record);
        self.ledger.enter(card_id, record.clone(), now);
        self.observer.on_card_entered(card_id, &record);
        self.publish_table();
        self.notify("Entry", "Entry complete, please remove card");
        self.await_removal(card_id.clone(), RemovalReason::Entered);
        self.mode = SessionMode::Idle;
    }

    fn begin_exit(&mut self, record: TagRecord, entered_at: SystemTime, now: SystemTime) {
        let parked = now.duration_since(entered_at).unwrap_or_default();
        // a policy never credits the card
        let fee = self.fee_policy.fee(parked).max(0);
        debug!("parked {:?}, fee {}", parked, fee);

        if record.balance < fee {
            let message = format!("Insufficient balance, minimum fee {fee}");
            self.set_status(message.clone());
            self.notify("Exit", &message);
            if let Err(e) = self.start_recharge(Some(fee)) {
                debug!("recharge unavailable: {}", e);
            }
            return;
        }

        let updated = record.with_balance(record.balance - fee);
        self.mode = SessionMode::Parking(ParkingState::Exiting {
            fee,
            entered_at,
            updated: updated.clone(),
        });
        self.set_status("Exiting, keep card on reader");
        self.start_write(updated, false);
    }

    /// The deducted balance is on the card: only now does the ledger
    /// forget the vehicle.
    pub(super) fn finish_exit(&mut self) {
        let SessionMode::Parking(ParkingState::Exiting { fee, updated, .. }) =
            std::mem::take(&mut self.mode)
        else {
            return;
        };
        let Some(card_id) = self.session.card_id().cloned() else {
            return;
        };

        let now = self.clock.wall();
        self.ledger.exit(&card_id, now);
        info!("exit: {} fee {}", card_id, fee);
        self.observer.on_card_exited(&card_id, &updated, fee);
        self.publish_table();
        let visit = self.ledger.visit(&card_id);
        self.observer
            .on_record_loaded(&card_id, &updated, visit.last_entry, visit.last_exit);
        self.notify("Exit", &format!("Exit complete, fee {fee}"));
        self.await_removal(card_id, RemovalReason::Exited { fee });
    }

    /// Blank or foreign card: drop any stale parking entry and ask for
    /// registration.
    pub(super) fn handle_invalid_card(&mut self, card_id: &CardId) {
        if self.ledger.forget(card_id) {
            self.publish_table();
        }
        if self.holds_for_removal(card_id) {
            return;
        }
        self.awaiting_removal = None;
        self.set_status("Card not initialized, please register");
        self.notify(
            "Unregistered card",
            "Card not initialized, keep it on the reader and register",
        );
        self.begin_registration(card_id);
    }

    pub(super) fn await_removal(&mut self, card_id: CardId, reason: RemovalReason) {
        self.set_status(reason.status());
        self.awaiting_removal = Some(AwaitingRemoval { card_id, reason });
    }
}
