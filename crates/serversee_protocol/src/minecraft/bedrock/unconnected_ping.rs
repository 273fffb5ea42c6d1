//! RakNet unconnected ping/pong, the only exchange needed to read a Bedrock
//! server's advertisement string.

use bytes::{BufMut, Bytes, BytesMut};

use crate::network::{ProtocolError, Result};

pub const UNCONNECTED_PING_ID: u8 = 0x01;
pub const UNCONNECTED_PONG_ID: u8 = 0x1C;

pub const OFFLINE_MESSAGE_DATA_ID: [u8; 16] = [
    0x00, 0xFF, 0xFF, 0x00, 0xFE, 0xFE, 0xFE, 0xFE, 0xFD, 0xFD, 0xFD, 0xFD, 0x12, 0x34, 0x56, 0x78,
];

/// id (1) + ping time (8) + server guid (8) + magic (16) + string length (2)
pub const PONG_HEADER_LEN: usize = 35;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnconnectedPing {
    pub timestamp_ms: i64,
    pub client_guid: i64,
}

impl UnconnectedPing {
    pub fn new(timestamp_ms: i64) -> Self {
        Self {
            timestamp_ms,
            client_guid: 0,
        }
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(1 + 8 + 16 + 8);
        buf.put_u8(UNCONNECTED_PING_ID);
        buf.put_i64(self.timestamp_ms);
        buf.put_slice(&OFFLINE_MESSAGE_DATA_ID);
        buf.put_i64(self.client_guid);
        buf.freeze()
    }
}

/// Pong reply. Only the advertisement text is kept; servers in the wild are
/// inconsistent about the header, so it is skipped rather than validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnconnectedPong {
    pub packet_id: u8,
    pub advertisement: String,
}

impl UnconnectedPong {
    pub fn from_bytes(datagram: &[u8]) -> Result<Self> {
        if datagram.len() < PONG_HEADER_LEN {
            return Err(ProtocolError::InvalidPayload(format!(
                "pong too short: {} bytes (need at least {})",
                datagram.len(),
                PONG_HEADER_LEN
            )));
        }

        Ok(Self {
            packet_id: datagram[0],
            advertisement: String::from_utf8_lossy(&datagram[PONG_HEADER_LEN..]).into_owned(),
        })
    }

    /// Builds a well-formed pong, used by test fixtures.
    pub fn to_bytes(&self, ping_time: i64, server_guid: i64) -> Bytes {
        let text = self.advertisement.as_bytes();
        let mut buf = BytesMut::with_capacity(PONG_HEADER_LEN + text.len());
        buf.put_u8(self.packet_id);
        buf.put_i64(ping_time);
        buf.put_i64(server_guid);
        buf.put_slice(&OFFLINE_MESSAGE_DATA_ID);
        buf.put_u16(text.len() as u16);
        buf.put_slice(text);
        buf.freeze()
    }

    pub fn fields(&self) -> Vec<&str> {
        self.advertisement.split(';').collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_layout() {
        let bytes = UnconnectedPing::new(0x0102_0304_0506_0708).to_bytes();
        assert_eq!(bytes.len(), 33);
        assert_eq!(bytes[0], 0x01);
        assert_eq!(&bytes[1..9], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(&bytes[9..25], &OFFLINE_MESSAGE_DATA_ID);
        assert_eq!(&bytes[25..], &[0u8; 8]);
    }

    #[test]
    fn test_pong_parsing() {
        let pong = UnconnectedPong {
            packet_id: UNCONNECTED_PONG_ID,
            advertisement: "MCPE;Dedicated Server;594;1.20.1;5;10;123;Bedrock level;Survival"
                .to_string(),
        };
        let bytes = pong.to_bytes(42, 7);
        let parsed = UnconnectedPong::from_bytes(&bytes).unwrap();

        assert_eq!(parsed, pong);
        assert_eq!(parsed.fields()[3], "1.20.1");
        assert_eq!(parsed.fields().len(), 9);
    }

    #[test]
    fn test_short_pong_rejected() {
        let err = UnconnectedPong::from_bytes(&[0x1C; 34]).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidPayload(_)));
    }

    #[test]
    fn test_header_only_pong_is_empty() {
        let parsed = UnconnectedPong::from_bytes(&[0u8; PONG_HEADER_LEN]).unwrap();
        assert_eq!(parsed.advertisement, "");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut bytes = vec![0u8; PONG_HEADER_LEN];
        bytes.extend_from_slice(&[b'M', 0xFF, b'E']);
        let parsed = UnconnectedPong::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.advertisement, "M\u{FFFD}E");
    }
}
