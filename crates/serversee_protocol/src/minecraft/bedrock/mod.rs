pub mod unconnected_ping;

pub use unconnected_ping::{
    OFFLINE_MESSAGE_DATA_ID, PONG_HEADER_LEN, UNCONNECTED_PING_ID, UNCONNECTED_PONG_ID,
    UnconnectedPing, UnconnectedPong,
};
