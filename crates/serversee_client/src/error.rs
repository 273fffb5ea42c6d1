use std::io;
use std::time::Duration;

use serversee_protocol::{PacketError, ProtocolError};
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Failures of a direct TCP or UDP status probe.
#[derive(Error, Debug)]
pub enum PingError {
    #[error("Connection to {0} timed out")]
    ConnectTimeout(String),

    #[error("Timed out waiting for a status response from {0}")]
    ReadTimeout(String),

    #[error("No reply from {0}")]
    Timeout(String),

    #[error("Connection refused by {0}")]
    ConnectionRefused(String),

    #[error("Protocol Error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Could not resolve {0}")]
    Resolve(String),

    #[error("IO Error: {0}")]
    Io(#[from] io::Error),
}

impl From<PacketError> for PingError {
    fn from(err: PacketError) -> Self {
        PingError::Protocol(err.into())
    }
}

/// Failures of the agent RPC transport.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Could not connect to {url}: {reason}")]
    NotConnected { url: String, reason: String },

    #[error("Failed to send request")]
    SendFailed,

    #[error("{0}")]
    RemoteError(String),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("WebSocket Error: {0}")]
    WebSocket(Box<tungstenite::Error>),
}

impl From<tungstenite::Error> for TransportError {
    fn from(err: tungstenite::Error) -> Self {
        match err {
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                TransportError::ConnectionClosed
            }
            other => TransportError::WebSocket(Box::new(other)),
        }
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Ping(#[from] PingError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Server is offline")]
    ServerOffline,

    #[error("Decode Error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("API Error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP Error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Unsupported(String),

    #[error("Invalid endpoint '{0}'")]
    InvalidEndpoint(String),
}

impl From<ProtocolError> for ClientError {
    fn from(err: ProtocolError) -> Self {
        ClientError::Ping(PingError::Protocol(err))
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
