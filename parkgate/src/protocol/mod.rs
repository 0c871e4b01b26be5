// parkgate/src/protocol/mod.rs

pub mod checksum;
pub mod codec;
pub mod commands;
pub mod frame;
pub mod packet;
pub mod parser;
pub mod responses;

pub use checksum::checksum;
pub use commands::Command;
pub use frame::{DecoderState, Frame, FrameDecoder};
pub use packet::{Direction, Packet};
pub use responses::Response;
