use crate::packet::Packet;
use crate::types::ProtocolWrite;
use std::io;

pub const SERVERBOUND_REQUEST_ID: u32 = 0x00;

/// Status request: an empty packet sent right after the handshake.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerBoundRequest;

impl ServerBoundRequest {
    pub fn new() -> Self {
        ServerBoundRequest
    }

    pub fn to_packet(&self) -> Packet {
        Packet::new(SERVERBOUND_REQUEST_ID)
    }
}

impl ProtocolWrite for ServerBoundRequest {
    fn write_to<W: io::Write>(&self, _writer: &mut W) -> io::Result<usize> {
        Ok(0)
    }
}
