use crate::types::VarInt;

/// Protocol version numbers for different Minecraft versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version(u32);

impl Version {
    /// Protocol version for Minecraft 1.20.4
    pub const V1_20_4: Version = Version(765);

    /// Version announced in status handshakes. Servers answer status
    /// requests regardless of the number, so a fixed one is enough.
    pub const PROBE: Version = Self::V1_20_4;

    pub const fn protocol_number(&self) -> u32 {
        self.0
    }

    pub fn to_varint(&self) -> VarInt {
        VarInt(self.0)
    }
}
