use std::io::{self, Read, Write};

use crate::packet::Result;

pub trait ProtocolWrite {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<usize>;
}

pub trait ProtocolRead: Sized {
    fn read_from<R: Read>(reader: &mut R) -> Result<(Self, usize)>;
}
