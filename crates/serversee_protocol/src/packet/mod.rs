//! Length-prefixed packet framing for the Java Edition protocol

use bytes::{Bytes, BytesMut};
use std::io;
use std::string::FromUtf8Error;
use thiserror::Error;

use crate::types::{ProtocolRead, ProtocolWrite, VarInt};

/// Largest frame accepted from a server. Status responses carry a base64
/// favicon, so they routinely reach tens of kilobytes.
pub const MAX_FRAME_LEN: usize = 2 * 1024 * 1024;

/// Error type for packet encoding and decoding
#[derive(Error, Debug)]
pub enum PacketError {
    #[error("IO Error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed VarInt: more than 5 bytes without termination")]
    MalformedVarInt,

    #[error("Invalid packet length: {length} (max: {max})")]
    InvalidLength { length: usize, max: usize },

    #[error("Invalid UTF-8 string: {0}")]
    InvalidString(#[from] FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, PacketError>;

/// A single protocol packet: a VarInt id followed by its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub id: u32,
    data: BytesMut,
}

impl Packet {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            data: BytesMut::new(),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn encode<T: ProtocolWrite>(&mut self, value: &T) -> Result<()> {
        let mut buffer = Vec::new();
        value.write_to(&mut buffer)?;
        self.data.extend_from_slice(&buffer);
        Ok(())
    }

    /// Decodes a value from the start of the payload.
    pub fn decode<T: ProtocolRead>(&self) -> Result<T> {
        let mut reader = &self.data[..];
        let (value, _) = T::read_from(&mut reader)?;
        Ok(value)
    }

    /// Splits a frame body (everything after the length prefix) into id and
    /// payload.
    pub fn from_body(body: Bytes) -> Result<Self> {
        let mut reader = &body[..];
        let (VarInt(id), id_len) = VarInt::read_from(&mut reader)?;
        Ok(Self {
            id,
            data: BytesMut::from(&body[id_len..]),
        })
    }

    /// Serializes the packet as `VarInt(length) ++ VarInt(id) ++ payload`.
    pub fn into_frame(self) -> BytesMut {
        let id = VarInt(self.id).to_bytes();
        let length = VarInt((id.len() + self.data.len()) as u32).to_bytes();

        let mut frame = BytesMut::with_capacity(length.len() + id.len() + self.data.len());
        frame.extend_from_slice(&length);
        frame.extend_from_slice(&id);
        frame.extend_from_slice(&self.data);
        frame
    }
}
