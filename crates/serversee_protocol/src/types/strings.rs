use crate::packet::{PacketError, Result};
use crate::types::traits::{ProtocolRead, ProtocolWrite};
use crate::types::var_numbers::VarInt;
use std::io::{self, Read, Write};

/// Upper bound on a single string: 32767 UTF-16 code units, up to 3 bytes each.
const MAX_STRING_BYTES: usize = 32767 * 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolString(pub String);

impl ProtocolWrite for ProtocolString {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<usize> {
        let bytes = self.0.as_bytes();
        let len = VarInt(bytes.len() as u32);
        let mut bytes_written = len.write_to(writer)?;
        writer.write_all(bytes)?;
        bytes_written += bytes.len();
        Ok(bytes_written)
    }
}

impl ProtocolRead for ProtocolString {
    fn read_from<R: Read>(reader: &mut R) -> Result<(Self, usize)> {
        let (VarInt(length), mut bytes_read) = VarInt::read_from(reader)?;
        let length = length as usize;
        if length > MAX_STRING_BYTES {
            return Err(PacketError::InvalidLength {
                length,
                max: MAX_STRING_BYTES,
            });
        }

        let mut buffer = vec![0u8; length];
        reader.read_exact(&mut buffer)?;
        bytes_read += length;

        let string = String::from_utf8(buffer)?;

        Ok((ProtocolString(string), bytes_read))
    }
}

impl From<&str> for ProtocolString {
    fn from(value: &str) -> Self {
        ProtocolString(value.to_string())
    }
}
