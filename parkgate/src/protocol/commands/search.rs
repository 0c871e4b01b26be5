// parkgate/src/protocol/commands/search.rs

use crate::types::CardId;

/// Encode SearchCard data (command code 0x46): request mode
pub fn encode_search(mode: u8) -> Vec<u8> {
    vec![mode]
}

/// Encode AntiColl data (command code 0x47): bit count
pub fn encode_anticoll(bit_count: u8) -> Vec<u8> {
    vec![bit_count]
}

/// Encode SelectCard data (command code 0x48): the identifier returned by
/// AntiColl, verbatim
pub fn encode_select(card_id: &CardId) -> Vec<u8> {
    card_id.as_bytes().to_vec()
}
