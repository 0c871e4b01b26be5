// parkgate/src/types.rs

use crate::Error;
use derive_more::Display;
use std::convert::TryFrom;
use std::str::FromStr;

/// Card identifier as reported by AntiColl (4-byte UID on S50 cards)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CardId(Vec<u8>);

impl CardId {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase hex without separators, e.g. `"aabbccdd"`
    pub fn to_hex(&self) -> String {
        crate::utils::bytes_to_hex(self.as_bytes())
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<&[u8]> for CardId {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.is_empty() {
            return Err(Error::InvalidLength {
                expected: 4,
                actual: 0,
            });
        }
        Ok(Self(bytes.to_vec()))
    }
}

/// BlockData (16 バイト)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockData([u8; 16]);

impl BlockData {
    pub const ZERO: Self = Self([0; 16]);

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        crate::utils::bytes_to_hex_spaced(self.as_bytes())
    }

    pub fn to_ascii_safe(&self) -> String {
        self.0
            .iter()
            .map(|&b| {
                if b.is_ascii_graphic() || b == b' ' {
                    b as char
                } else {
                    '.'
                }
            })
            .collect()
    }
}

impl TryFrom<&[u8]> for BlockData {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != 16 {
            return Err(Error::InvalidLength {
                expected: 16,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 16];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }
}

/// Reader command codes. WriteCard follows Authentication sequentially.
#[repr(u8)]
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandCode {
    SearchCard = 0x46,
    AntiColl = 0x47,
    SelectCard = 0x48,
    Authentication = 0x4A,
    ReadCard = 0x4B,
    WriteCard = 0x4C,
}

impl CommandCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for CommandCode {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0x46 => Ok(Self::SearchCard),
            0x47 => Ok(Self::AntiColl),
            0x48 => Ok(Self::SelectCard),
            0x4A => Ok(Self::Authentication),
            0x4B => Ok(Self::ReadCard),
            0x4C => Ok(Self::WriteCard),
            other => Err(Error::UnknownCommand(other)),
        }
    }
}

/// Card family reported by SelectCard
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    S50,
    S70,
}

impl CardKind {
    pub fn from_type_byte(b: u8) -> Self {
        if b == crate::constants::S50_TYPE_BYTE {
            Self::S50
        } else {
            Self::S70
        }
    }
}

/// Vehicle type stored in byte 3 of the owner block
#[repr(u8)]
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VehicleType {
    #[default]
    Other = 0,
    Sedan = 1,
    #[display(fmt = "SUV")]
    Suv = 2,
    Truck = 3,
    Electric = 4,
}

impl VehicleType {
    pub const ALL: [VehicleType; 5] = [
        VehicleType::Sedan,
        VehicleType::Suv,
        VehicleType::Truck,
        VehicleType::Electric,
        VehicleType::Other,
    ];

    /// Unknown codes map to `Other`.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::Sedan,
            2 => Self::Suv,
            3 => Self::Truck,
            4 => Self::Electric,
            _ => Self::Other,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl FromStr for VehicleType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VehicleType::ALL
            .iter()
            .copied()
            .find(|v| v.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidInput(format!("unknown vehicle type '{}'", s)))
    }
}
