// parkgate/src/parking/ledger.rs

use std::collections::BTreeMap;
use std::time::SystemTime;

use crate::card::TagRecord;
use crate::types::{CardId, VehicleType};

/// A vehicle currently on the lot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParkedVehicle {
    pub entered_at: SystemTime,
    pub record: TagRecord,
}

/// Most recent entry and exit, kept after the vehicle leaves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Visit {
    pub last_entry: Option<SystemTime>,
    pub last_exit: Option<SystemTime>,
}

/// One row of the parking table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParkingRow {
    pub card_id: String,
    pub owner: String,
    pub vehicle: VehicleType,
    pub entered_at: SystemTime,
    pub balance: i32,
}

/// In-memory map of parked cards. The tag is the durable store of the
/// balance; this is a cache for display and the entry/exit decision.
#[derive(Debug, Clone, Default)]
pub struct ParkingLedger {
    parked: BTreeMap<CardId, ParkedVehicle>,
    visits: BTreeMap<CardId, Visit>,
}

impl ParkingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, id: &CardId, record: TagRecord, at: SystemTime) {
        self.parked.insert(
            id.clone(),
            ParkedVehicle {
                entered_at: at,
                record,
            },
        );
        self.visits.entry(id.clone()).or_default().last_entry = Some(at);
    }

    /// Remove a parked card and stamp its exit.
    pub fn exit(&mut self, id: &CardId, at: SystemTime) -> Option<ParkedVehicle> {
        let parked = self.parked.remove(id)?;
        let visit = self.visits.entry(id.clone()).or_default();
        visit.last_entry = Some(parked.entered_at);
        visit.last_exit = Some(at);
        Some(parked)
    }

    /// Drop everything known about `id` except its last exit. Returns
    /// whether the card was parked.
    pub fn forget(&mut self, id: &CardId) -> bool {
        if let Some(v) = self.visits.get_mut(id) {
            v.last_entry = None;
        }
        self.parked.remove(id).is_some()
    }

    pub fn get(&self, id: &CardId) -> Option<&ParkedVehicle> {
        self.parked.get(id)
    }

    pub fn is_parked(&self, id: &CardId) -> bool {
        self.parked.contains_key(id)
    }

    /// Refresh the cached record of a parked card.
    pub fn update_record(&mut self, id: &CardId, record: &TagRecord) -> bool {
        match self.parked.get_mut(id) {
            Some(p) if &p.record != record => {
                p.record = record.clone();
                true
            }
            _ => false,
        }
    }

    pub fn visit(&self, id: &CardId) -> Visit {
        self.visits.get(id).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.parked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parked.is_empty()
    }

    pub fn rows(&self) -> Vec<ParkingRow> {
        self.parked
            .iter()
            .map(|(id, p)| ParkingRow {
                card_id: id.to_hex(),
                owner: p.record.owner.clone(),
                vehicle: p.record.vehicle,
                entered_at: p.entered_at,
                balance: p.record.balance,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.parked.clear();
        self.visits.clear();
    }
}
