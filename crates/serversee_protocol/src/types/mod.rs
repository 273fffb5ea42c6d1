mod primitives;
mod strings;
mod traits;
mod var_numbers;

pub use primitives::UnsignedShort;
pub use strings::ProtocolString;
pub use traits::{ProtocolRead, ProtocolWrite};
pub use var_numbers::{VarInt, read_varint_async};

pub const MAX_VARINT_LEN: usize = 5;
