// parkgate/src/card/session.rs

use crate::card::record::TagRecord;
use crate::types::{BlockData, CardId, CardKind};
use crate::Result;

/// Which half of a two-block write is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStep {
    Owner,
    Balance,
}

/// A record being written back, block 1 then block 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    pub record: TagRecord,
    pub owner_block: BlockData,
    pub balance_block: BlockData,
    pub step: WriteStep,
    /// Read both blocks back once written.
    pub read_back: bool,
}

impl PendingWrite {
    pub fn new(record: TagRecord, read_back: bool) -> Self {
        let (owner_block, balance_block) = record.encode();
        Self {
            record,
            owner_block,
            balance_block,
            step: WriteStep::Owner,
            read_back,
        }
    }
}

/// Per-detection state of the card in the field.
#[derive(Debug, Clone, Default)]
pub struct CardSession {
    card_id: Option<CardId>,
    kind: Option<CardKind>,
    authenticated: bool,
    block1: Option<BlockData>,
    block2: Option<BlockData>,
    pending_read: Option<u8>,
    pending_write: Option<PendingWrite>,
    record: Option<TagRecord>,
}

impl CardSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn card_id(&self) -> Option<&CardId> {
        self.card_id.as_ref()
    }

    /// Adopt the identifier from anti-collision. A different card starts a
    /// fresh session.
    pub fn set_card(&mut self, id: CardId) {
        if self.card_id.as_ref() != Some(&id) {
            *self = Self {
                card_id: Some(id),
                ..Self::default()
            };
        }
    }

    pub fn kind(&self) -> Option<CardKind> {
        self.kind
    }

    pub fn set_kind(&mut self, kind: CardKind) {
        self.kind = Some(kind);
        self.authenticated = false;
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn set_authenticated(&mut self, authenticated: bool) {
        self.authenticated = authenticated;
    }

    pub fn pending_read(&self) -> Option<u8> {
        self.pending_read
    }

    pub fn set_pending_read(&mut self, block: Option<u8>) {
        self.pending_read = block;
    }

    pub fn cache_owner_block(&mut self, data: BlockData) {
        self.block1 = Some(data);
    }

    pub fn cache_balance_block(&mut self, data: BlockData) {
        self.block2 = Some(data);
    }

    pub fn blocks(&self) -> Option<(&BlockData, &BlockData)> {
        Some((self.block1.as_ref()?, self.block2.as_ref()?))
    }

    /// Decode the cached blocks; the current record follows the result.
    pub fn validate(&mut self) -> Result<TagRecord> {
        let result = match self.blocks() {
            Some((b1, b2)) => TagRecord::decode(b1, b2),
            None => Err(crate::Error::RecordInvalid),
        };
        self.record = result.as_ref().ok().cloned();
        result
    }

    pub fn record(&self) -> Option<&TagRecord> {
        self.record.as_ref()
    }

    pub fn pending_write(&self) -> Option<&PendingWrite> {
        self.pending_write.as_ref()
    }

    pub fn pending_write_mut(&mut self) -> Option<&mut PendingWrite> {
        self.pending_write.as_mut()
    }

    pub fn set_pending_write(&mut self, write: Option<PendingWrite>) {
        self.pending_write = write;
    }

    pub fn take_pending_write(&mut self) -> Option<PendingWrite> {
        self.pending_write.take()
    }

    /// Remember what a completed write put on the card.
    pub fn commit_write(&mut self, write: &PendingWrite) {
        self.block1 = Some(write.owner_block);
        self.block2 = Some(write.balance_block);
        self.record = Some(write.record.clone());
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
