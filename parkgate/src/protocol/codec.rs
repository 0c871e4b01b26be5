// parkgate/src/protocol/codec.rs

use crate::types::CommandCode;
use crate::Result;

use super::commands::Command;
use super::packet::Packet;
use super::responses::Response;

/// Encode a Command into an outgoing packet addressed to `address`.
pub fn encode_command_packet(address: u16, cmd: &Command) -> Result<Packet> {
    Packet::new(address, cmd.command_code().as_u8(), &cmd.encode())
}

/// Encode a Command straight to escaped wire bytes.
pub fn encode_command_frame(address: u16, cmd: &Command) -> Result<Vec<u8>> {
    Ok(encode_command_packet(address, cmd)?.to_raw())
}

/// Interpret a reply packet for the command code it carries.
pub fn decode_reply(packet: &Packet) -> Result<(CommandCode, Response)> {
    let code = CommandCode::try_from(packet.command())?;
    let response = Response::decode(code, packet.data())?;
    Ok((code, response))
}

/// Decode a pure frame (as produced by the streaming decoder) and parse
/// the contained reply.
pub fn decode_reply_frame(pure: &[u8]) -> Result<(CommandCode, Response)> {
    decode_reply(&Packet::from_pure(pure)?)
}
