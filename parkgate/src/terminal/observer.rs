// parkgate/src/terminal/observer.rs

use std::time::SystemTime;

use crate::card::TagRecord;
use crate::parking::ParkingRow;
use crate::types::{CardId, VehicleType};

/// Operator input the terminal is waiting for. Answer with
/// `Terminal::submit_registration` or `Terminal::submit_recharge`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputRequest {
    Registration {
        card_id: CardId,
    },
    Recharge {
        card_id: CardId,
        balance: i32,
        required_fee: Option<i32>,
    },
}

/// Registration dialog contents.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegistrationForm {
    pub owner: String,
    pub vehicle: VehicleType,
    pub balance: i32,
}

impl RegistrationForm {
    pub fn new(owner: impl Into<String>, vehicle: VehicleType, balance: i32) -> Self {
        Self {
            owner: owner.into(),
            vehicle,
            balance,
        }
    }
}

/// Presentation hooks. Every method has a no-op default so a host only
/// implements what it renders.
pub trait TerminalObserver {
    fn on_card_entered(&mut self, _card_id: &CardId, _record: &TagRecord) {}

    fn on_card_exited(&mut self, _card_id: &CardId, _record: &TagRecord, _fee: i32) {}

    fn on_status_changed(&mut self, _text: &str) {}

    fn on_parking_table_changed(&mut self, _rows: &[ParkingRow]) {}

    /// Info panel: the record just read plus the card's last entry/exit.
    fn on_record_loaded(
        &mut self,
        _card_id: &CardId,
        _record: &TagRecord,
        _entered_at: Option<SystemTime>,
        _exited_at: Option<SystemTime>,
    ) {
    }

    fn notify_user(&mut self, _title: &str, _message: &str) {}

    fn request_input(&mut self, _request: &InputRequest) {}
}

impl TerminalObserver for () {}

impl<T: TerminalObserver + ?Sized> TerminalObserver for Box<T> {
    fn on_card_entered(&mut self, card_id: &CardId, record: &TagRecord) {
        (**self).on_card_entered(card_id, record)
    }

    fn on_card_exited(&mut self, card_id: &CardId, record: &TagRecord, fee: i32) {
        (**self).on_card_exited(card_id, record, fee)
    }

    fn on_status_changed(&mut self, text: &str) {
        (**self).on_status_changed(text)
    }

    fn on_parking_table_changed(&mut self, rows: &[ParkingRow]) {
        (**self).on_parking_table_changed(rows)
    }

    fn on_record_loaded(
        &mut self,
        card_id: &CardId,
        record: &TagRecord,
        entered_at: Option<SystemTime>,
        exited_at: Option<SystemTime>,
    ) {
        (**self).on_record_loaded(card_id, record, entered_at, exited_at)
    }

    fn notify_user(&mut self, title: &str, message: &str) {
        (**self).notify_user(title, message)
    }

    fn request_input(&mut self, request: &InputRequest) {
        (**self).request_input(request)
    }
}
