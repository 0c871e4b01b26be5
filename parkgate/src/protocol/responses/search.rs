// parkgate/src/protocol/responses/search.rs

use crate::protocol::parser;
use crate::types::{CardId, CardKind};
use crate::Result;

/// SearchCard carries an optional ATQA after the status byte. Only the
/// status matters, so the body is accepted as-is.
pub fn decode_search(_body: &[u8]) -> Result<()> {
    Ok(())
}

/// AntiColl: the remainder of the reply is the card identifier.
pub fn decode_anticoll(body: &[u8]) -> Result<CardId> {
    parser::card_id_from(body, 0)
}

/// SelectCard: first byte is the card type (SAK).
pub fn decode_select(body: &[u8]) -> Result<CardKind> {
    Ok(CardKind::from_type_byte(parser::byte_at(body, 0)?))
}
