//! Status probing and agent communication for ServerSee
//!
//! Two ways of learning about a game server live here: probing it directly
//! over the Java (TCP) or Bedrock (UDP) status protocols, and talking to the
//! companion agent on the server host over a persistent, signed WebSocket
//! RPC channel. [`service::StatusService`] routes a configured server to the
//! right one and [`monitor::Monitor`] keeps a set of servers refreshed.

pub mod api;
pub mod error;
pub mod model;
pub mod monitor;
pub mod normalize;
pub mod ping;
pub mod public_api;
pub mod rpc;
pub mod service;
pub mod text;

pub use api::{AgentApi, LogStream};
pub use error::{ClientError, PingError, Result, TransportError};
pub use model::{ServerMetrics, ServerStatus, WhitelistResponse};
pub use monitor::{Monitor, ServerSnapshot};
pub use public_api::{Edition, PublicStatusClient};
pub use rpc::{
    AgentTransport, ConnectionState, Connector, InboundFrame, PushSubscription,
    TransportOptions, TransportRegistry, WebSocketConnector,
};
pub use service::StatusService;
