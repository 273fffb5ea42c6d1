use std::pin::Pin;

use async_trait::async_trait;
use futures_util::{Sink, SinkExt, Stream, StreamExt, future};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::USER_AGENT;

use crate::error::TransportError;

pub const USER_AGENT_VALUE: &str = "ServerSee-RS";

/// Outgoing half of a connection: accepts text frames.
pub type FrameSink = Pin<Box<dyn Sink<String, Error = TransportError> + Send>>;
/// Incoming half of a connection: yields text frames until the peer closes.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String, TransportError>> + Send>>;

/// Opens the socket under an [`AgentTransport`](super::AgentTransport).
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<(FrameSink, FrameStream), TransportError>;
}

/// Production connector over tokio-tungstenite.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, url: &str) -> Result<(FrameSink, FrameStream), TransportError> {
        let mut request = url.into_client_request()?;
        request
            .headers_mut()
            .insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let (socket, _response) = connect_async(request).await?;
        let (sink, stream) = socket.split();

        let sink = sink.with(|text: String| {
            future::ready(Ok::<_, TransportError>(Message::Text(text)))
        });
        // Control frames are answered by tungstenite itself.
        let stream = stream.filter_map(|message| {
            future::ready(match message {
                Ok(Message::Text(text)) => Some(Ok(text)),
                Ok(Message::Binary(bytes)) => String::from_utf8(bytes).ok().map(Ok),
                Ok(_) => None,
                Err(e) => Some(Err(TransportError::from(e))),
            })
        });

        Ok((Box::pin(sink), Box::pin(stream)))
    }
}

/// Maps an agent endpoint to its WebSocket URL: `http` becomes `ws`,
/// `https` becomes `wss`, a bare host gets `ws://`, and the path always ends
/// with `/`.
pub fn websocket_url(endpoint: &str) -> String {
    let endpoint = endpoint.trim();
    let mut url = if let Some(rest) = endpoint.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = endpoint.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if endpoint.starts_with("ws://") || endpoint.starts_with("wss://") {
        endpoint.to_string()
    } else {
        format!("ws://{endpoint}")
    };
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}
