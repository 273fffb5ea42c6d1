use crate::network::{ProtocolError, Result};
use crate::packet::Packet;
use crate::types::{ProtocolRead, ProtocolString, ProtocolWrite};
use serde::{Deserialize, Serialize};
use std::io;

pub const CLIENTBOUND_RESPONSE_ID: u32 = 0x00;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientBoundResponse {
    pub json_response: ProtocolString,
}

impl ClientBoundResponse {
    pub fn new(json: impl Into<String>) -> Self {
        Self {
            json_response: ProtocolString(json.into()),
        }
    }

    /// Decodes a status response, rejecting any packet id other than 0x00.
    pub fn from_packet(packet: &Packet) -> Result<Self> {
        if packet.id != CLIENTBOUND_RESPONSE_ID {
            return Err(ProtocolError::UnexpectedPacket {
                expected: CLIENTBOUND_RESPONSE_ID,
                actual: packet.id,
            });
        }
        Ok(packet.decode()?)
    }

    pub fn to_packet(&self) -> Result<Packet> {
        let mut packet = Packet::new(CLIENTBOUND_RESPONSE_ID);
        packet.encode(&self.json_response)?;
        Ok(packet)
    }

    pub fn parse_json(&self) -> Result<ResponseJSON> {
        serde_json::from_str(&self.json_response.0)
            .map_err(|e| ProtocolError::InvalidPayload(e.to_string()))
    }
}

impl ProtocolWrite for ClientBoundResponse {
    fn write_to<W: io::Write>(&self, writer: &mut W) -> io::Result<usize> {
        self.json_response.write_to(writer)
    }
}

impl ProtocolRead for ClientBoundResponse {
    fn read_from<R: io::Read>(reader: &mut R) -> crate::packet::Result<(Self, usize)> {
        let (json_response, n) = ProtocolString::read_from(reader)?;
        Ok((Self { json_response }, n))
    }
}

/// Status document sent by Java Edition servers. Every field is optional in
/// practice; modded and proxy servers omit or reshape parts of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseJSON {
    #[serde(default)]
    pub version: Option<VersionJSON>,
    #[serde(default)]
    pub players: Option<PlayersJSON>,
    #[serde(default)]
    pub description: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionJSON {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub protocol: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayersJSON {
    #[serde(default)]
    pub max: i64,
    #[serde(default)]
    pub online: i64,
}
