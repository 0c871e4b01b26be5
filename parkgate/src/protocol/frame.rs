// parkgate/src/protocol/frame.rs

use crate::constants::{FRAME_ESCAPE, FRAME_START, FRAME_STOP};
use crate::{Error, Result};

/// Pending frames longer than this are discarded; the reader never sends
/// anything close to it.
const MAX_PENDING_LEN: usize = 1024;

/// Wire framing helper.
/// Format: [0x02] [content, 0x10 before any literal 0x10 or 0x03] [0x03]
pub struct Frame;

impl Frame {
    /// Wrap content bytes with start/stop markers, escaping as needed.
    pub fn encode(content: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(content.len() + 4);
        out.push(FRAME_START);
        out.extend_from_slice(&Self::escape(content));
        out.push(FRAME_STOP);
        out
    }

    /// Strip the markers of a complete wire frame and un-escape its content.
    pub fn decode(raw: &[u8]) -> Result<Vec<u8>> {
        if raw.len() < 2 {
            return Err(Error::InvalidLength {
                expected: 2,
                actual: raw.len(),
            });
        }
        if raw[0] != FRAME_START {
            return Err(Error::FrameFormat("missing start marker".into()));
        }
        if raw[raw.len() - 1] != FRAME_STOP {
            return Err(Error::FrameFormat("missing stop marker".into()));
        }
        Self::unescape(&raw[1..raw.len() - 1])
    }

    /// Insert an escape byte before every literal escape or stop byte.
    pub fn escape(content: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(content.len() + content.len() / 8 + 1);
        for &b in content {
            if b == FRAME_ESCAPE || b == FRAME_STOP {
                out.push(FRAME_ESCAPE);
            }
            out.push(b);
        }
        out
    }

    /// Inverse of [`Frame::escape`]. An unescaped stop byte or a dangling
    /// escape means the content was cut short.
    pub fn unescape(escaped: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(escaped.len());
        let mut iter = escaped.iter();
        while let Some(&b) = iter.next() {
            match b {
                FRAME_ESCAPE => match iter.next() {
                    Some(&literal) => out.push(literal),
                    None => return Err(Error::FrameFormat("dangling escape byte".into())),
                },
                FRAME_STOP => return Err(Error::FrameFormat("unescaped stop marker".into())),
                _ => out.push(b),
            }
        }
        Ok(out)
    }
}

/// Scanner state of [`FrameDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecoderState {
    /// Looking for a start marker; everything else is ignored.
    #[default]
    Idle,
    /// Collecting frame bytes until an unescaped stop marker.
    Accumulating,
    /// The previous byte was an escape; the next one is taken literally.
    Escaped,
}

/// Streaming deframer. State carries over between [`FrameDecoder::feed`]
/// calls, so a frame may be split across any number of reads.
///
/// Emitted frames are "pure": start marker, un-escaped content, stop marker.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    state: DecoderState,
    pending: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Drop any partially received frame.
    pub fn reset(&mut self) {
        self.state = DecoderState::Idle;
        self.pending.clear();
    }

    /// Lazily scan `bytes`, yielding each frame as it completes.
    pub fn feed<'a>(&'a mut self, bytes: &'a [u8]) -> Frames<'a> {
        Frames {
            decoder: self,
            bytes: bytes.iter(),
        }
    }

    /// Advance the scanner by one byte.
    pub fn push_byte(&mut self, b: u8) -> Option<Vec<u8>> {
        match self.state {
            DecoderState::Idle => {
                if b == FRAME_START {
                    self.pending.clear();
                    self.pending.push(b);
                    self.state = DecoderState::Accumulating;
                }
                None
            }
            DecoderState::Accumulating => match b {
                FRAME_ESCAPE => {
                    self.state = DecoderState::Escaped;
                    None
                }
                FRAME_STOP => {
                    self.pending.push(b);
                    self.state = DecoderState::Idle;
                    Some(std::mem::take(&mut self.pending))
                }
                _ => self.append(b),
            },
            DecoderState::Escaped => {
                self.state = DecoderState::Accumulating;
                self.append(b)
            }
        }
    }

    fn append(&mut self, b: u8) -> Option<Vec<u8>> {
        self.pending.push(b);
        if self.pending.len() > MAX_PENDING_LEN {
            log::debug!("discarding oversized partial frame ({} bytes)", self.pending.len());
            self.reset();
        }
        None
    }
}

/// Iterator returned by [`FrameDecoder::feed`].
pub struct Frames<'a> {
    decoder: &'a mut FrameDecoder,
    bytes: std::slice::Iter<'a, u8>,
}

impl Iterator for Frames<'_> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        for &b in self.bytes.by_ref() {
            if let Some(frame) = self.decoder.push_byte(b) {
                return Some(frame);
            }
        }
        None
    }
}
