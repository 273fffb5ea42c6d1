//! Java Edition status ping: handshake, status request, one JSON response.

use std::io;
use std::time::Duration;

use serversee_config::LogType;
use serversee_protocol::minecraft::java::ServerBoundHandshake;
use serversee_protocol::minecraft::java::status::{ClientBoundResponse, ServerBoundRequest};
use serversee_protocol::{MAX_FRAME_LEN, read_frame, write_packet};
use tokio::net::TcpStream;
use tokio::time;
use tracing::{debug, instrument};

use super::resolve;
use crate::error::PingError;
use crate::model::ServerStatus;
use crate::normalize;

/// Queries a Java Edition server for its status.
///
/// Connecting and the exchange that follows are each bounded by `timeout`.
/// The socket is dropped on every exit path.
#[instrument(name = "java_ping", level = "debug", skip(timeout))]
pub async fn probe(address: &str, port: u16, timeout: Duration) -> Result<ServerStatus, PingError> {
    let json = exchange(address, port, timeout).await?;
    let status = normalize::from_java(&json)?;
    debug!(
        log_type = LogType::Ping.as_str(),
        players = status.players,
        max = status.max_players,
        version = %status.version,
        "Java status received"
    );
    Ok(status)
}

/// Same exchange as [`probe`], keeping only the favicon. Never fails.
pub async fn fetch_favicon(address: &str, port: u16, timeout: Duration) -> Option<String> {
    let result = exchange(address, port, timeout).await.and_then(|json| {
        ClientBoundResponse::new(json)
            .parse_json()
            .map_err(PingError::from)
    });

    match result {
        Ok(response) => response.favicon,
        Err(e) => {
            debug!(
                log_type = LogType::Ping.as_str(),
                address,
                port,
                error = %e,
                "No favicon"
            );
            None
        }
    }
}

async fn exchange(address: &str, port: u16, timeout: Duration) -> Result<String, PingError> {
    let target = format!("{address}:{port}");

    let connect = async {
        let addrs = resolve(address, port).await?;
        TcpStream::connect(&addrs[..]).await.map_err(PingError::from)
    };
    let mut stream = match time::timeout(timeout, connect).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(PingError::Io(e))) if e.kind() == io::ErrorKind::ConnectionRefused => {
            return Err(PingError::ConnectionRefused(target));
        }
        Ok(Err(e)) => return Err(e),
        Err(_) => return Err(PingError::ConnectTimeout(target)),
    };

    let status_exchange = async {
        stream.set_nodelay(true)?;

        let handshake = ServerBoundHandshake::status(address, port).to_packet()?;
        write_packet(&mut stream, handshake).await?;
        write_packet(&mut stream, ServerBoundRequest::new().to_packet()).await?;

        let packet = read_frame(&mut stream, MAX_FRAME_LEN).await?;
        let response = ClientBoundResponse::from_packet(&packet)?;
        Ok::<_, PingError>(response.json_response.0)
    };

    match time::timeout(timeout, status_exchange).await {
        Ok(result) => result,
        Err(_) => Err(PingError::ReadTimeout(target)),
    }
}
