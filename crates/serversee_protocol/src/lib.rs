//! Minecraft status protocol implementation for ServerSee
//!
//! This crate provides the wire codecs needed to query a server for its
//! status: the Java Edition handshake/status exchange and the Bedrock
//! Edition unconnected ping.

pub mod minecraft;
pub mod network;
pub mod packet;
pub mod types;
pub mod version;

// Re-export the most commonly used types
pub use network::{ProtocolError, read_frame, write_packet};
pub use packet::{MAX_FRAME_LEN, Packet, PacketError};
pub use types::{ProtocolRead, ProtocolString, ProtocolWrite, VarInt};
pub use version::Version;
