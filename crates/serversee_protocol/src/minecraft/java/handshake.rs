use std::io;

use crate::network::{ProtocolError, Result as ProtocolResult};
use crate::packet::{Packet, Result as PacketResult};
use crate::types::{ProtocolRead, ProtocolString, ProtocolWrite, UnsignedShort, VarInt};
use crate::version::Version;

pub const SERVERBOUND_HANDSHAKE_ID: u32 = 0x00;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerBoundHandshake {
    pub protocol_version: VarInt,
    pub server_address: ProtocolString,
    pub server_port: UnsignedShort,
    pub next_state: VarInt,
}

impl ServerBoundHandshake {
    pub const STATE_STATUS: u32 = 1;

    pub fn new(
        protocol_version: u32,
        server_address: impl Into<String>,
        server_port: u16,
        next_state: u32,
    ) -> Self {
        Self {
            protocol_version: VarInt(protocol_version),
            server_address: ProtocolString(server_address.into()),
            server_port: UnsignedShort(server_port),
            next_state: VarInt(next_state),
        }
    }

    /// Handshake announcing the status state, as sent by the prober.
    pub fn status(host: impl Into<String>, port: u16) -> Self {
        Self::new(
            Version::PROBE.protocol_number(),
            host,
            port,
            Self::STATE_STATUS,
        )
    }

    pub fn is_status_request(&self) -> bool {
        self.next_state.0 == Self::STATE_STATUS
    }

    pub fn to_packet(&self) -> PacketResult<Packet> {
        let mut packet = Packet::new(SERVERBOUND_HANDSHAKE_ID);
        packet.encode(self)?;
        Ok(packet)
    }

    pub fn from_packet(packet: &Packet) -> ProtocolResult<Self> {
        if packet.id != SERVERBOUND_HANDSHAKE_ID {
            return Err(ProtocolError::UnexpectedPacket {
                expected: SERVERBOUND_HANDSHAKE_ID,
                actual: packet.id,
            });
        }
        Ok(packet.decode()?)
    }
}

impl ProtocolWrite for ServerBoundHandshake {
    fn write_to<W: io::Write>(&self, writer: &mut W) -> io::Result<usize> {
        let mut written = 0;
        written += self.protocol_version.write_to(writer)?;
        written += self.server_address.write_to(writer)?;
        written += self.server_port.write_to(writer)?;
        written += self.next_state.write_to(writer)?;
        Ok(written)
    }
}

impl ProtocolRead for ServerBoundHandshake {
    fn read_from<R: io::Read>(reader: &mut R) -> PacketResult<(Self, usize)> {
        let mut bytes_read = 0;

        let (protocol_version, n) = VarInt::read_from(reader)?;
        bytes_read += n;

        let (server_address, n) = ProtocolString::read_from(reader)?;
        bytes_read += n;

        let (server_port, n) = UnsignedShort::read_from(reader)?;
        bytes_read += n;

        let (next_state, n) = VarInt::read_from(reader)?;
        bytes_read += n;

        Ok((
            Self {
                protocol_version,
                server_address,
                server_port,
                next_state,
            },
            bytes_read,
        ))
    }
}
