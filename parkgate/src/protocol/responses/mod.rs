// parkgate/src/protocol/responses/mod.rs

pub mod auth;
pub mod read;
pub mod search;
pub mod write;

pub use auth::decode_authentication;
pub use read::decode_read;
pub use search::{decode_anticoll, decode_search, decode_select};
pub use write::decode_write;

use crate::types::{BlockData, CardId, CardKind, CommandCode};

/// High-level Response enum. Per-command decoders live in
/// `protocol::responses::<name>.rs` and are dispatched here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    CardFound,
    AntiColl { card_id: CardId },
    Selected { kind: CardKind },
    Authenticated,
    Block(BlockData),
    Written,
}

impl Response {
    /// Decode a reply data field (status byte first) for the given command.
    ///
    /// A nonzero status yields `Error::CardStatus`; an empty data field is
    /// reported as `Error::InvalidLength`. Callers treat both as a failure
    /// of that command.
    pub fn decode(command: CommandCode, data: &[u8]) -> crate::Result<Self> {
        let body = crate::protocol::parser::expect_success(command.as_u8(), data)?;

        match command {
            CommandCode::SearchCard => {
                decode_search(body)?;
                Ok(Self::CardFound)
            }
            CommandCode::AntiColl => Ok(Self::AntiColl {
                card_id: decode_anticoll(body)?,
            }),
            CommandCode::SelectCard => Ok(Self::Selected {
                kind: decode_select(body)?,
            }),
            CommandCode::Authentication => {
                decode_authentication(body)?;
                Ok(Self::Authenticated)
            }
            CommandCode::ReadCard => Ok(Self::Block(decode_read(body)?)),
            CommandCode::WriteCard => {
                decode_write(body)?;
                Ok(Self::Written)
            }
        }
    }
}
