// parkgate/src/terminal/mode.rs

use std::time::SystemTime;

use crate::card::TagRecord;
use crate::types::CardId;

/// What the terminal is doing. Automatic search only runs in `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionMode {
    #[default]
    Idle,
    Registering(RegistrationState),
    Recharging(RechargeState),
    Parking(ParkingState),
}

impl SessionMode {
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionMode::Idle)
    }

    /// Waiting on the operator rather than on the card.
    pub fn awaiting_input(&self) -> bool {
        matches!(
            self,
            SessionMode::Registering(RegistrationState::AwaitingInput)
                | SessionMode::Recharging(RechargeState {
                    step: RechargeStep::AwaitingInput,
                    ..
                })
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationState {
    AwaitingInput,
    Writing { record: TagRecord },
    Verifying { record: TagRecord },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RechargeState {
    /// Exit fee the new balance must cover, when the recharge was forced
    /// by an exit.
    pub required_fee: Option<i32>,
    pub step: RechargeStep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RechargeStep {
    AwaitingInput,
    Writing { expected: TagRecord },
    Verifying { expected: TagRecord },
    /// Cancelled or failed with an exit fee outstanding. Search stays
    /// paused until the operator recharges or abandons.
    Declined,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParkingState {
    /// Fee deducted, updated record being written.
    Exiting {
        fee: i32,
        entered_at: SystemTime,
        updated: TagRecord,
    },
}

/// Why the card in the field is being ignored until it is lifted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalReason {
    Registered,
    RegistrationCancelled,
    Recharged { balance: i32 },
    RechargeCancelled,
    Entered,
    Exited { fee: i32 },
}

impl RemovalReason {
    pub fn status(&self) -> String {
        match self {
            RemovalReason::Registered => "Registered, please remove card".to_string(),
            RemovalReason::RegistrationCancelled => {
                "Registration cancelled, please remove card".to_string()
            }
            RemovalReason::Recharged { balance } => {
                format!("Recharged, balance {balance}, please remove card")
            }
            RemovalReason::RechargeCancelled => {
                "Recharge cancelled, please remove card".to_string()
            }
            RemovalReason::Entered => "Entry complete, please remove card".to_string(),
            RemovalReason::Exited { fee } => {
                format!("Exit complete, fee {fee}, please remove card")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwaitingRemoval {
    pub card_id: CardId,
    pub reason: RemovalReason,
}
