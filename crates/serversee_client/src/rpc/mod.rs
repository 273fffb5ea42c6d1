//! JSON-over-WebSocket RPC with the companion agent.
//!
//! One [`AgentTransport`] multiplexes concurrent requests over a single
//! connection, matching replies by correlation id, and fans `push` frames
//! out to every [`PushSubscription`].

pub mod connector;
pub mod envelope;
pub mod push;
pub mod registry;
pub mod signing;
pub mod transport;

pub use connector::{Connector, FrameSink, FrameStream, WebSocketConnector, websocket_url};
pub use envelope::{InboundFrame, RequestEnvelope};
pub use push::{PushHub, PushSubscription};
pub use registry::TransportRegistry;
pub use transport::{AgentTransport, ConnectionState, TransportOptions};
