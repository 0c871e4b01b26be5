// parkgate/src/protocol/commands/mod.rs

pub mod auth;
pub mod read;
pub mod search;
pub mod write;

pub use auth::encode_authentication;
pub use read::encode_read;
pub use search::{encode_anticoll, encode_search, encode_select};
pub use write::encode_write;

use crate::types::{BlockData, CardId, CommandCode};

/// High-level Command enum. New commands should be added here and
/// their per-command encoder placed in `protocol::commands::<name>.rs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SearchCard {
        mode: u8,
    },
    AntiColl {
        bit_count: u8,
    },
    SelectCard {
        card_id: CardId,
    },
    Authentication {
        block: u8,
        key: [u8; 6],
    },
    ReadCard {
        block: u8,
    },
    WriteCard {
        block: u8,
        data: BlockData,
    },
}

impl Command {
    pub fn search() -> Self {
        Self::SearchCard {
            mode: crate::constants::SEARCH_MODE_ALL,
        }
    }

    pub fn anticoll() -> Self {
        Self::AntiColl {
            bit_count: crate::constants::ANTICOLL_BIT_COUNT,
        }
    }

    pub fn command_code(&self) -> CommandCode {
        match self {
            Self::SearchCard { .. } => CommandCode::SearchCard,
            Self::AntiColl { .. } => CommandCode::AntiColl,
            Self::SelectCard { .. } => CommandCode::SelectCard,
            Self::Authentication { .. } => CommandCode::Authentication,
            Self::ReadCard { .. } => CommandCode::ReadCard,
            Self::WriteCard { .. } => CommandCode::WriteCard,
        }
    }

    /// Encode the command's data field (the command code travels in the
    /// packet header).
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::SearchCard { mode } => encode_search(*mode),
            Self::AntiColl { bit_count } => encode_anticoll(*bit_count),
            Self::SelectCard { card_id } => encode_select(card_id),
            Self::Authentication { block, key } => encode_authentication(*block, key),
            Self::ReadCard { block } => encode_read(*block),
            Self::WriteCard { block, data } => encode_write(*block, data),
        }
    }

    /// Block number the command targets, if any.
    pub fn block(&self) -> Option<u8> {
        match self {
            Self::Authentication { block, .. }
            | Self::ReadCard { block }
            | Self::WriteCard { block, .. } => Some(*block),
            _ => None,
        }
    }
}
