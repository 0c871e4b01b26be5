// parkgate/src/reader/mod.rs

//! Transport session: one command in flight, reply correlation, retry on
//! timeout and duplicate suppression.

pub mod dedup;

pub use dedup::DedupGuard;

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::config::{PortConfig, TerminalConfig};
use crate::protocol::codec;
use crate::protocol::{Command, FrameDecoder, Packet, Response};
use crate::transport::Transport;
use crate::types::CommandCode;
use crate::utils::bytes_to_hex_spaced;
use crate::{Error, Result};

/// The single outstanding command.
#[derive(Debug, Clone)]
pub struct Exchange {
    command: Command,
    raw: Vec<u8>,
    retries: u32,
    deadline: Instant,
}

impl Exchange {
    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn code(&self) -> CommandCode {
        self.command.command_code()
    }

    /// Retransmissions so far.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}

/// A reply accepted for the exchange it answers.
#[derive(Debug, Clone)]
pub struct Reply {
    pub request: Command,
    pub packet: Packet,
}

impl Reply {
    pub fn code(&self) -> CommandCode {
        self.request.command_code()
    }

    /// Decode the reply data. Nonzero status and empty payloads are errors.
    pub fn response(&self) -> Result<Response> {
        Response::decode(self.code(), self.packet.data())
    }
}

/// Reader session over a byte transport.
pub struct Reader {
    transport: Box<dyn Transport>,
    decoder: FrameDecoder,
    inbound: VecDeque<Packet>,
    pending: Option<Exchange>,
    guard: DedupGuard,
    address: u16,
    reply_timeout: Duration,
    max_retries: u32,
}

impl std::fmt::Debug for Reader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader")
            .field("open", &self.transport.is_open())
            .field("pending", &self.pending)
            .field("inbound", &self.inbound.len())
            .finish()
    }
}

impl Reader {
    pub fn new(transport: Box<dyn Transport>, config: &TerminalConfig) -> Self {
        Self {
            transport,
            decoder: FrameDecoder::new(),
            inbound: VecDeque::new(),
            pending: None,
            guard: DedupGuard::new(config.dedup_window, config.dedup_retention),
            address: config.address,
            reply_timeout: config.reply_timeout,
            max_retries: config.max_reply_retries,
        }
    }

    pub fn open(&mut self, port: &PortConfig) -> Result<()> {
        self.transport.open(port)?;
        self.decoder.reset();
        Ok(())
    }

    /// Close the transport and forget every in-flight and queued reply.
    pub fn close(&mut self) {
        self.transport.close();
        self.clear();
    }

    /// Drop in-flight state without touching the transport.
    pub fn clear(&mut self) {
        self.decoder.reset();
        self.inbound.clear();
        self.pending = None;
        self.guard.clear();
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_open()
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&Exchange> {
        self.pending.as_ref()
    }

    pub fn pending_code(&self) -> Option<CommandCode> {
        self.pending.as_ref().map(Exchange::code)
    }

    /// Encode and write `cmd`, arming the reply timer. Refused while
    /// another exchange is outstanding; nothing is written then.
    pub fn send(&mut self, cmd: Command, now: Instant) -> Result<()> {
        if !self.transport.is_open() {
            return Err(Error::NotOpen);
        }
        if let Some(p) = &self.pending {
            return Err(Error::Busy {
                pending: p.code().as_u8(),
            });
        }
        let raw = codec::encode_command_frame(self.address, &cmd)?;
        // anything still queued arrived before this command was written
        if !self.inbound.is_empty() {
            debug!("drop {} stale packet(s)", self.inbound.len());
            self.inbound.clear();
        }
        debug!("send {}", bytes_to_hex_spaced(&raw));
        self.transport.write_bytes(&raw)?;
        self.pending = Some(Exchange {
            command: cmd,
            raw,
            retries: 0,
            deadline: now + self.reply_timeout,
        });
        Ok(())
    }

    /// Read whatever the transport has and queue the decoded packets.
    /// Malformed frames are dropped here. Returns the number queued.
    pub fn pump(&mut self, now: Instant) -> Result<usize> {
        self.guard.prune(now);
        let bytes = self.transport.read_available()?;
        if bytes.is_empty() {
            return Ok(0);
        }
        let mut queued = 0;
        for pure in self.decoder.feed(&bytes) {
            match Packet::from_pure(&pure) {
                Ok(packet) => {
                    self.inbound.push_back(packet);
                    queued += 1;
                }
                Err(e) => debug!("drop frame {}: {}", bytes_to_hex_spaced(&pure), e),
            }
        }
        Ok(queued)
    }

    /// Hand out the next queued packet that answers the in-flight
    /// exchange, or `None` once the queue holds nothing acceptable.
    ///
    /// Packets with no exchange outstanding, for another command, or
    /// copying a reply already taken for another block within the dedup
    /// window are discarded on the way.
    pub fn next_reply(&mut self, now: Instant) -> Option<Reply> {
        while let Some(packet) = self.inbound.pop_front() {
            let Some(pending) = &self.pending else {
                debug!("drop unsolicited cmd=0x{:02x}", packet.command());
                continue;
            };
            if packet.command() != pending.code().as_u8() {
                debug!(
                    "drop cmd=0x{:02x} while waiting for 0x{:02x}",
                    packet.command(),
                    pending.code().as_u8()
                );
                continue;
            }
            let block = pending.command.block();
            let duplicate = self
                .guard
                .is_duplicate(packet.command(), block, packet.data(), now);
            if duplicate {
                debug!("drop duplicate cmd=0x{:02x}", packet.command());
                continue;
            }

            debug!(
                "recv cmd=0x{:02x} data={}",
                packet.command(),
                bytes_to_hex_spaced(packet.data())
            );
            let exchange = self.pending.take()?;
            return Some(Reply {
                request: exchange.command,
                packet,
            });
        }
        None
    }

    /// Retransmit the in-flight command once its deadline passes. After
    /// `max_reply_retries` retransmissions the exchange is abandoned and
    /// `Error::Timeout` returned.
    pub fn poll_timeout(&mut self, now: Instant) -> Result<()> {
        let Some(pending) = self.pending.as_mut() else {
            return Ok(());
        };
        if now < pending.deadline {
            return Ok(());
        }
        if pending.retries < self.max_retries {
            pending.retries += 1;
            pending.deadline = now + self.reply_timeout;
            warn!(
                "retry {}/{} cmd=0x{:02x}",
                pending.retries,
                self.max_retries,
                pending.code().as_u8()
            );
            if let Err(e) = self.transport.write_bytes(&pending.raw) {
                warn!("retransmit failed: {}", e);
            }
            return Ok(());
        }
        let command = pending.code().as_u8();
        self.pending = None;
        warn!("timeout cmd=0x{:02x}", command);
        Err(Error::Timeout { command })
    }
}
