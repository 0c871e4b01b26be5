// parkgate/src/protocol/packet.rs

use crate::constants::{
    FRAME_START, FRAME_STOP, MAX_PACKET_DATA_LEN, MIN_PURE_FRAME_LEN, REPLY_LENGTH_OVERHEAD,
    SEND_LENGTH_OVERHEAD,
};
use crate::protocol::checksum::checksum;
use crate::protocol::frame::Frame;
use crate::{Error, Result};

/// Which way a packet travels, recovered from its length byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Host to reader: length = data + 3
    Send,
    /// Reader to host: length = data + 2
    Reply,
}

impl Direction {
    fn overhead(self) -> usize {
        match self {
            Direction::Send => SEND_LENGTH_OVERHEAD,
            Direction::Reply => REPLY_LENGTH_OVERHEAD,
        }
    }
}

/// One protocol message.
/// Content layout: [addr lo] [addr hi] [len] [cmd] [data ...] [checksum]
///
/// The "pure" form is the content between start/stop markers without
/// escaping; the "raw" form is what travels on the wire.
/// Packets are immutable; [`Packet::with_data`] builds a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    address: u16,
    length: u8,
    command: u8,
    data: Vec<u8>,
    checksum: u8,
}

impl Packet {
    /// Build an outgoing command packet.
    pub fn new(address: u16, command: u8, data: &[u8]) -> Result<Self> {
        Self::build(address, command, data, Direction::Send)
    }

    /// Build a reply-shaped packet, as the reader firmware emits them.
    pub fn reply(address: u16, command: u8, data: &[u8]) -> Result<Self> {
        Self::build(address, command, data, Direction::Reply)
    }

    fn build(address: u16, command: u8, data: &[u8], direction: Direction) -> Result<Self> {
        if data.len() > MAX_PACKET_DATA_LEN {
            return Err(Error::InvalidLength {
                expected: MAX_PACKET_DATA_LEN,
                actual: data.len(),
            });
        }
        let length = (data.len() + direction.overhead()) as u8;
        Ok(Self {
            address,
            length,
            command,
            data: data.to_vec(),
            checksum: checksum(address, length, command, data),
        })
    }

    /// Parse a pure frame (start marker, un-escaped content, stop marker),
    /// as produced by [`crate::protocol::FrameDecoder`].
    pub fn from_pure(pure: &[u8]) -> Result<Self> {
        if pure.len() < MIN_PURE_FRAME_LEN {
            return Err(Error::InvalidLength {
                expected: MIN_PURE_FRAME_LEN,
                actual: pure.len(),
            });
        }
        if pure[0] != FRAME_START || pure[pure.len() - 1] != FRAME_STOP {
            return Err(Error::FrameFormat("missing start/stop marker".into()));
        }
        Self::from_content(&pure[1..pure.len() - 1])
    }

    /// Parse a raw (escaped) wire frame.
    pub fn from_raw(raw: &[u8]) -> Result<Self> {
        let content = Frame::decode(raw)?;
        if content.len() + 2 < MIN_PURE_FRAME_LEN {
            return Err(Error::InvalidLength {
                expected: MIN_PURE_FRAME_LEN,
                actual: content.len() + 2,
            });
        }
        Self::from_content(&content)
    }

    fn from_content(content: &[u8]) -> Result<Self> {
        let address = u16::from_le_bytes([content[0], content[1]]);
        let length = content[2];
        let command = content[3];
        let data = &content[4..content.len() - 1];
        let actual_checksum = content[content.len() - 1];

        let send_len = data.len() + SEND_LENGTH_OVERHEAD;
        let reply_len = data.len() + REPLY_LENGTH_OVERHEAD;
        if length as usize != send_len && length as usize != reply_len {
            return Err(Error::InvalidLength {
                expected: reply_len,
                actual: length as usize,
            });
        }

        let expected_checksum = checksum(address, length, command, data);
        if actual_checksum != expected_checksum {
            return Err(Error::ChecksumMismatch {
                expected: expected_checksum,
                actual: actual_checksum,
            });
        }

        Ok(Self {
            address,
            length,
            command,
            data: data.to_vec(),
            checksum: actual_checksum,
        })
    }

    fn content(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len() + 5);
        out.extend_from_slice(&self.address.to_le_bytes());
        out.push(self.length);
        out.push(self.command);
        out.extend_from_slice(&self.data);
        out.push(self.checksum);
        out
    }

    /// Start marker, un-escaped content, stop marker.
    pub fn to_pure(&self) -> Vec<u8> {
        let content = self.content();
        let mut out = Vec::with_capacity(content.len() + 2);
        out.push(FRAME_START);
        out.extend_from_slice(&content);
        out.push(FRAME_STOP);
        out
    }

    /// Escaped bytes ready for the wire.
    pub fn to_raw(&self) -> Vec<u8> {
        Frame::encode(&self.content())
    }

    pub fn direction(&self) -> Direction {
        if self.length as usize == self.data.len() + SEND_LENGTH_OVERHEAD {
            Direction::Send
        } else {
            Direction::Reply
        }
    }

    pub fn is_send(&self) -> bool {
        self.direction() == Direction::Send
    }

    pub fn is_reply(&self) -> bool {
        self.direction() == Direction::Reply
    }

    /// A copy of this command packet carrying different data. Only send
    /// packets may be re-targeted.
    pub fn with_data(&self, data: &[u8]) -> Result<Self> {
        if !self.is_send() {
            return Err(Error::FrameFormat("only send packets can change data".into()));
        }
        Self::new(self.address, self.command, data)
    }

    pub fn address(&self) -> u16 {
        self.address
    }

    pub fn length(&self) -> u8 {
        self.length
    }

    pub fn command(&self) -> u8 {
        self.command
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn checksum(&self) -> u8 {
        self.checksum
    }
}
