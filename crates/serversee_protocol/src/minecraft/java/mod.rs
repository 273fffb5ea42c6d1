pub mod handshake;
pub mod status;

pub use handshake::{SERVERBOUND_HANDSHAKE_ID, ServerBoundHandshake};
