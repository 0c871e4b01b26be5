// parkgate/src/transport/emulator.rs

//! In-process reader and S50 card emulator speaking the same wire protocol
//! as the real module. Used by the test-suite and for bench demos without
//! hardware.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::rc::Rc;

use log::debug;

use crate::config::PortConfig;
use crate::constants::{ANTICOLL_BIT_COUNT, AUTH_KEY_A, DEFAULT_AUTH_KEY, S50_TYPE_BYTE};
use crate::protocol::{FrameDecoder, Packet};
use crate::transport::traits::Transport;
use crate::types::{BlockData, CardId, CommandCode};
use crate::utils::bytes_to_hex;
use crate::{Error, Result};

/// Blocks on an emulated S50 card (16 sectors x 4 blocks).
pub const EMULATED_BLOCKS: usize = 64;

pub const STATUS_OK: u8 = 0x00;
pub const STATUS_FAIL: u8 = 0x01;
pub const STATUS_AUTH_FAIL: u8 = 0x02;
pub const STATUS_BAD_BLOCK: u8 = 0x03;
pub const STATUS_UNKNOWN_COMMAND: u8 = 0x7F;

const TAG_TYPE_S50: [u8; 2] = [0x04, 0x00];

/// One emulated card: identifier, key A shared by all sectors, and
/// authentication state for the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmulatedCard {
    uid: CardId,
    type_byte: u8,
    key: [u8; 6],
    blocks: Vec<[u8; 16]>,
    authed: BTreeSet<u8>,
}

impl EmulatedCard {
    pub fn new(uid: &[u8]) -> Self {
        Self {
            uid: CardId::from_bytes(uid),
            type_byte: S50_TYPE_BYTE,
            key: DEFAULT_AUTH_KEY,
            blocks: vec![[0u8; 16]; EMULATED_BLOCKS],
            authed: BTreeSet::new(),
        }
    }

    pub fn with_type_byte(mut self, type_byte: u8) -> Self {
        self.type_byte = type_byte;
        self
    }

    pub fn with_key(mut self, key: [u8; 6]) -> Self {
        self.key = key;
        self
    }

    pub fn with_block(mut self, block: u8, data: BlockData) -> Self {
        if let Some(b) = self.blocks.get_mut(block as usize) {
            *b = *data.as_bytes();
        }
        self
    }

    pub fn uid(&self) -> &CardId {
        &self.uid
    }

    pub fn block(&self, block: u8) -> Option<BlockData> {
        self.blocks
            .get(block as usize)
            .map(|b| BlockData::from_bytes(*b))
    }

    /// Zero blocks 1 and 2 and drop authentication.
    pub fn clear_user_blocks(&mut self) {
        self.blocks[1] = [0u8; 16];
        self.blocks[2] = [0u8; 16];
        self.authed.clear();
    }

    fn reset_session(&mut self) {
        self.authed.clear();
    }

    fn auth_a(&mut self, block: u8, key: &[u8]) -> u8 {
        if block as usize >= self.blocks.len() {
            return STATUS_BAD_BLOCK;
        }
        if key != self.key.as_slice() {
            return STATUS_AUTH_FAIL;
        }
        // セクタ単位で認証
        let base = block - block % 4;
        self.authed.extend(base..base + 4);
        STATUS_OK
    }

    fn read(&self, block: u8) -> std::result::Result<[u8; 16], u8> {
        if block as usize >= self.blocks.len() {
            return Err(STATUS_BAD_BLOCK);
        }
        if !self.authed.contains(&block) {
            return Err(STATUS_AUTH_FAIL);
        }
        Ok(self.blocks[block as usize])
    }

    fn write(&mut self, block: u8, payload: &[u8]) -> u8 {
        if block as usize >= self.blocks.len() {
            return STATUS_BAD_BLOCK;
        }
        if !self.authed.contains(&block) {
            return STATUS_AUTH_FAIL;
        }
        self.blocks[block as usize].copy_from_slice(payload);
        STATUS_OK
    }
}

#[derive(Debug, Default)]
struct EmulatorState {
    open: bool,
    decoder: FrameDecoder,
    cards: Vec<EmulatedCard>,
    present: Option<usize>,
    selected: Option<usize>,
    outbound: VecDeque<u8>,
    received: Vec<Packet>,
    silent_when_absent: bool,
    drop_commands: usize,
    drop_replies: usize,
    duplicate_replies: usize,
    forced: HashMap<u8, (usize, u8)>,
}

impl EmulatorState {
    fn reply(address: u16, command: u8, data: &[u8]) -> Result<Packet> {
        Packet::reply(address, command, data)
    }

    fn present_card(&mut self) -> Option<&mut EmulatedCard> {
        let idx = self.present?;
        self.cards.get_mut(idx)
    }

    /// The selected card, as long as it is still in the field.
    fn selected_card(&mut self) -> Option<&mut EmulatedCard> {
        match (self.selected, self.present) {
            (Some(s), Some(p)) if s == p => self.cards.get_mut(s),
            _ => None,
        }
    }

    fn handle(&mut self, cmd: &Packet) -> Result<Option<Packet>> {
        let addr = cmd.address();
        let code = cmd.command();
        let data = cmd.data();

        if let Some((remaining, status)) = self.forced.get_mut(&code) {
            if *remaining > 0 {
                *remaining -= 1;
                let status = *status;
                return Self::reply(addr, code, &[status]).map(Some);
            }
        }

        if self.present.is_none() && self.silent_when_absent {
            return Ok(None);
        }

        let body: Vec<u8> = match CommandCode::try_from(code) {
            Ok(CommandCode::SearchCard) => match self.present_card() {
                Some(card) if card.type_byte == S50_TYPE_BYTE => {
                    vec![STATUS_OK, TAG_TYPE_S50[0], TAG_TYPE_S50[1]]
                }
                Some(_) => vec![STATUS_OK, 0x02, 0x00],
                None => vec![STATUS_FAIL],
            },
            Ok(CommandCode::AntiColl) => {
                if data != [ANTICOLL_BIT_COUNT].as_slice() {
                    vec![STATUS_FAIL]
                } else {
                    match self.present_card() {
                        Some(card) => {
                            let mut out = vec![STATUS_OK];
                            out.extend_from_slice(card.uid.as_bytes());
                            out
                        }
                        None => vec![STATUS_FAIL],
                    }
                }
            }
            Ok(CommandCode::SelectCard) => {
                let present = self.present;
                match present.and_then(|i| self.cards.get_mut(i).map(|c| (i, c))) {
                    Some((i, card)) if card.uid.as_bytes() == data => {
                        card.reset_session();
                        let type_byte = card.type_byte;
                        self.selected = Some(i);
                        vec![STATUS_OK, type_byte]
                    }
                    _ => vec![STATUS_FAIL],
                }
            }
            Ok(CommandCode::Authentication) => match self.selected_card() {
                Some(card) if data.len() == 8 && data[0] == AUTH_KEY_A => {
                    vec![card.auth_a(data[1], &data[2..8])]
                }
                _ => vec![STATUS_FAIL],
            },
            Ok(CommandCode::ReadCard) => match self.selected_card() {
                Some(card) if data.len() == 1 => match card.read(data[0]) {
                    Ok(block) => {
                        let mut out = vec![STATUS_OK];
                        out.extend_from_slice(&block);
                        out
                    }
                    Err(status) => vec![status],
                },
                _ => vec![STATUS_FAIL],
            },
            Ok(CommandCode::WriteCard) => match self.selected_card() {
                Some(card) if data.len() == 17 => vec![card.write(data[0], &data[1..])],
                _ => vec![STATUS_FAIL],
            },
            Err(_) => vec![STATUS_UNKNOWN_COMMAND],
        };

        Self::reply(addr, code, &body).map(Some)
    }

    fn process(&mut self, bytes: &[u8]) -> Result<()> {
        let frames: Vec<Vec<u8>> = self.decoder.feed(bytes).collect();
        for pure in frames {
            let packet = match Packet::from_pure(&pure) {
                Ok(p) => p,
                Err(e) => {
                    debug!("emu: invalid frame {}: {}", bytes_to_hex(&pure), e);
                    continue;
                }
            };
            self.received.push(packet.clone());

            if self.drop_commands > 0 {
                self.drop_commands -= 1;
                debug!("emu: dropped command 0x{:02x}", packet.command());
                continue;
            }

            let Some(reply) = self.handle(&packet)? else {
                continue;
            };

            if self.drop_replies > 0 {
                self.drop_replies -= 1;
                debug!("emu: dropped reply 0x{:02x}", reply.command());
                continue;
            }

            let raw = reply.to_raw();
            self.outbound.extend(raw.iter().copied());
            if self.duplicate_replies > 0 {
                self.duplicate_replies -= 1;
                debug!("emu: duplicated reply 0x{:02x}", reply.command());
                self.outbound.extend(raw.iter().copied());
            }
        }
        Ok(())
    }
}

/// Emulated reader module. Clones share state, so tests keep a handle to
/// move cards in and out of the field while a `Reader` owns another.
#[derive(Debug, Clone, Default)]
pub struct EmulatedReader {
    state: Rc<RefCell<EmulatorState>>,
}

impl EmulatedReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card; returns its index. The card starts out of the field.
    pub fn add_card(&self, card: EmulatedCard) -> usize {
        let mut st = self.state.borrow_mut();
        st.cards.push(card);
        st.cards.len() - 1
    }

    /// Put card `index` in the field, replacing whichever card was there.
    pub fn present_card(&self, index: usize) {
        let mut st = self.state.borrow_mut();
        if index >= st.cards.len() {
            return;
        }
        if st.present != Some(index) {
            st.selected = None;
        }
        st.present = Some(index);
    }

    /// Lift the current card out of the field.
    pub fn remove_card(&self) {
        let mut st = self.state.borrow_mut();
        if let Some(i) = st.present.take() {
            st.cards[i].reset_session();
        }
        st.selected = None;
    }

    pub fn present(&self) -> Option<usize> {
        self.state.borrow().present
    }

    pub fn card(&self, index: usize) -> Option<EmulatedCard> {
        self.state.borrow().cards.get(index).cloned()
    }

    pub fn block(&self, index: usize, block: u8) -> Option<BlockData> {
        self.state.borrow().cards.get(index)?.block(block)
    }

    pub fn set_block(&self, index: usize, block: u8, data: BlockData) {
        let mut st = self.state.borrow_mut();
        if let Some(b) = st
            .cards
            .get_mut(index)
            .and_then(|c| c.blocks.get_mut(block as usize))
        {
            *b = *data.as_bytes();
        }
    }

    pub fn clear_user_blocks(&self, index: usize) {
        if let Some(card) = self.state.borrow_mut().cards.get_mut(index) {
            card.clear_user_blocks();
        }
    }

    /// Stay silent instead of replying with a failure status while no card
    /// is in the field.
    pub fn set_silent_when_absent(&self, silent: bool) {
        self.state.borrow_mut().silent_when_absent = silent;
    }

    /// Ignore the next `n` commands entirely.
    pub fn drop_next_commands(&self, n: usize) {
        self.state.borrow_mut().drop_commands = n;
    }

    /// Process the next `n` commands but lose their replies.
    pub fn drop_next_replies(&self, n: usize) {
        self.state.borrow_mut().drop_replies = n;
    }

    /// Send each of the next `n` replies twice.
    pub fn duplicate_next_replies(&self, n: usize) {
        self.state.borrow_mut().duplicate_replies = n;
    }

    /// Answer the next `n` occurrences of `command` with `status`.
    pub fn fail_next(&self, command: CommandCode, n: usize, status: u8) {
        self.state
            .borrow_mut()
            .forced
            .insert(command.as_u8(), (n, status));
    }

    /// Command packets received so far, including dropped ones.
    pub fn received(&self) -> Vec<Packet> {
        self.state.borrow().received.clone()
    }

    /// Command codes received so far, oldest first.
    pub fn received_codes(&self) -> Vec<u8> {
        self.state
            .borrow()
            .received
            .iter()
            .map(Packet::command)
            .collect()
    }

    pub fn clear_received(&self) {
        self.state.borrow_mut().received.clear();
    }
}

impl Transport for EmulatedReader {
    fn open(&mut self, _config: &PortConfig) -> Result<()> {
        let mut st = self.state.borrow_mut();
        if st.open {
            return Err(Error::AlreadyOpen);
        }
        st.open = true;
        Ok(())
    }

    fn close(&mut self) {
        let mut st = self.state.borrow_mut();
        st.open = false;
        st.decoder.reset();
        st.outbound.clear();
    }

    fn is_open(&self) -> bool {
        self.state.borrow().open
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let mut st = self.state.borrow_mut();
        if !st.open {
            return Err(Error::NotOpen);
        }
        st.process(bytes)
    }

    fn read_available(&mut self) -> Result<Vec<u8>> {
        let mut st = self.state.borrow_mut();
        if !st.open {
            return Err(Error::NotOpen);
        }
        Ok(st.outbound.drain(..).collect())
    }
}
