use crate::packet::{PacketError, Result};
use crate::types::MAX_VARINT_LEN;
use crate::types::traits::{ProtocolRead, ProtocolWrite};
use bytes::{BufMut, BytesMut};
use std::io::{self, Read, Write};
use tokio::io::{AsyncRead, AsyncReadExt};

const SEGMENT_BITS: u32 = 0x7F;
const CONTINUE_BIT: u8 = 0x80;

/// Protocol variable-length integer: 7 data bits per byte, low groups first,
/// high bit set on every byte except the last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarInt(pub u32);

impl VarInt {
    /// Number of bytes the encoded form occupies (1..=5).
    pub fn encoded_len(&self) -> usize {
        let mut value = self.0;
        let mut size = 1;
        while value > SEGMENT_BITS {
            value >>= 7;
            size += 1;
        }
        size
    }

    pub fn to_bytes(&self) -> BytesMut {
        let mut buffer = BytesMut::with_capacity(MAX_VARINT_LEN);
        let mut value = self.0;

        loop {
            let mut byte = (value & SEGMENT_BITS) as u8;
            value >>= 7;

            if value != 0 {
                byte |= CONTINUE_BIT;
            }

            buffer.put_u8(byte);

            if value == 0 {
                break;
            }
        }

        buffer
    }

    pub fn encode(value: u32) -> BytesMut {
        VarInt(value).to_bytes()
    }

    pub fn decode<R: Read>(reader: &mut R) -> Result<u32> {
        let (VarInt(value), _) = VarInt::read_from(reader)?;
        Ok(value)
    }

    /// Folds one wire byte into `value`. Returns `true` once the terminating
    /// byte has been seen.
    fn accumulate(value: &mut u32, byte: u8, index: usize) -> bool {
        *value |= ((byte as u32) & SEGMENT_BITS) << (7 * index);
        byte & CONTINUE_BIT == 0
    }
}

impl ProtocolWrite for VarInt {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<usize> {
        let bytes = self.to_bytes();
        writer.write_all(&bytes)?;
        Ok(bytes.len())
    }
}

impl ProtocolRead for VarInt {
    fn read_from<R: Read>(reader: &mut R) -> Result<(Self, usize)> {
        let mut value: u32 = 0;

        for index in 0..MAX_VARINT_LEN {
            let mut buf = [0u8; 1];
            reader.read_exact(&mut buf)?;

            if VarInt::accumulate(&mut value, buf[0], index) {
                return Ok((VarInt(value), index + 1));
            }
        }

        Err(PacketError::MalformedVarInt)
    }
}

/// Reads a VarInt directly from an async stream, one byte at a time.
pub async fn read_varint_async<R: AsyncRead + Unpin>(reader: &mut R) -> Result<(u32, usize)> {
    let mut value: u32 = 0;

    for index in 0..MAX_VARINT_LEN {
        let byte = reader.read_u8().await?;
        if VarInt::accumulate(&mut value, byte, index) {
            return Ok((value, index + 1));
        }
    }

    Err(PacketError::MalformedVarInt)
}
