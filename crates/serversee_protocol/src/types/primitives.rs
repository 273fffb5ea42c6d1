use crate::packet::Result;
use crate::types::traits::{ProtocolRead, ProtocolWrite};
use std::io::{self, Read, Write};

// UnsignedShort type (big-endian)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsignedShort(pub u16);

impl ProtocolWrite for UnsignedShort {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<usize> {
        writer.write_all(&self.0.to_be_bytes())?;
        Ok(2)
    }
}

impl ProtocolRead for UnsignedShort {
    fn read_from<R: Read>(reader: &mut R) -> Result<(Self, usize)> {
        let mut buf = [0u8; 2];
        reader.read_exact(&mut buf)?;
        Ok((UnsignedShort(u16::from_be_bytes(buf)), 2))
    }
}
