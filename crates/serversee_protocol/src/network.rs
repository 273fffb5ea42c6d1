//! Network-related helpers for reading and writing framed packets

use bytes::Bytes;
use std::io;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::packet::{Packet, PacketError};
use crate::types::read_varint_async;

/// Error type for network protocol operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("IO Error: {0}")]
    Io(#[from] io::Error),

    #[error("Packet Error: {0}")]
    Packet(#[from] PacketError),

    #[error("Unexpected packet id 0x{actual:02x} (expected 0x{expected:02x})")]
    UnexpectedPacket { expected: u32, actual: u32 },

    #[error("Invalid status payload: {0}")]
    InvalidPayload(String),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Reads one length-prefixed frame and splits off its packet id.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R, max_len: usize) -> Result<Packet> {
    let (length, _) = read_varint_async(reader).await?;
    let length = length as usize;
    if length == 0 || length > max_len {
        return Err(PacketError::InvalidLength {
            length,
            max: max_len,
        }
        .into());
    }

    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).await?;

    Ok(Packet::from_body(Bytes::from(body))?)
}

pub async fn write_packet<W: AsyncWrite + Unpin>(writer: &mut W, packet: Packet) -> Result<()> {
    writer.write_all(&packet.into_frame()).await?;
    writer.flush().await?;
    Ok(())
}
