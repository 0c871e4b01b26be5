// parkgate/src/card/record.rs

use crate::constants::{OWNER_NAME_LEN, TAG_FORMAT_VERSION, TAG_SIGNATURE};
use crate::types::{BlockData, VehicleType};
use crate::{Error, Result};

/// Owner, vehicle and balance stored across the two user blocks.
///
/// Block 1: `"PK"` signature, format version, vehicle code, 12-byte
/// Latin-1 owner name padded with NUL.
/// Block 2: balance as i32 little-endian, rest zero.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagRecord {
    pub owner: String,
    pub vehicle: VehicleType,
    pub balance: i32,
}

impl TagRecord {
    pub fn new(owner: impl Into<String>, vehicle: VehicleType, balance: i32) -> Self {
        Self {
            owner: owner.into(),
            vehicle,
            balance,
        }
    }

    pub fn with_balance(&self, balance: i32) -> Self {
        Self {
            balance,
            ..self.clone()
        }
    }

    pub fn encode(&self) -> (BlockData, BlockData) {
        let mut b1 = [0u8; 16];
        b1[..2].copy_from_slice(&TAG_SIGNATURE);
        b1[2] = TAG_FORMAT_VERSION;
        b1[3] = self.vehicle.code();
        for (slot, c) in b1[4..].iter_mut().zip(self.owner.chars().take(OWNER_NAME_LEN)) {
            // Latin-1 only
            *slot = u8::try_from(u32::from(c)).unwrap_or(b'?');
        }

        let mut b2 = [0u8; 16];
        b2[..4].copy_from_slice(&self.balance.to_le_bytes());

        (BlockData::from_bytes(b1), BlockData::from_bytes(b2))
    }

    /// Fails with `RecordInvalid` unless block 1 carries the signature.
    pub fn decode(block1: &BlockData, block2: &BlockData) -> Result<Self> {
        let b1 = block1.as_bytes();
        let b2 = block2.as_bytes();
        if b1[..2] != TAG_SIGNATURE {
            return Err(Error::RecordInvalid);
        }
        let owner: String = b1[4..4 + OWNER_NAME_LEN]
            .iter()
            .map(|&b| char::from(b))
            .collect();
        let owner = owner
            .trim_matches(|c: char| c == '\0' || c.is_whitespace())
            .to_string();
        let balance = i32::from_le_bytes([b2[0], b2[1], b2[2], b2[3]]);

        Ok(Self {
            owner,
            vehicle: VehicleType::from_code(b1[3]),
            balance,
        })
    }
}

impl std::fmt::Display for TagRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}) balance={}", self.owner, self.vehicle, self.balance)
    }
}
