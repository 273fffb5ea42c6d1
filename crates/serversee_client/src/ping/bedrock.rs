//! Bedrock Edition status ping over a single RakNet unconnected ping.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use chrono::Utc;
use serversee_config::LogType;
use serversee_protocol::minecraft::bedrock::{UnconnectedPing, UnconnectedPong};
use tokio::net::UdpSocket;
use tokio::time;
use tracing::{debug, instrument};

use super::resolve;
use crate::error::PingError;
use crate::model::ServerStatus;
use crate::normalize;

const RECV_BUFFER_LEN: usize = 2048;

/// Sends one unconnected ping and waits up to `timeout` for the pong.
/// The returned status never carries an icon; see [`super::icon`].
#[instrument(name = "bedrock_ping", level = "debug", skip(timeout))]
pub async fn probe(address: &str, port: u16, timeout: Duration) -> Result<ServerStatus, PingError> {
    let target_name = format!("{address}:{port}");

    let target = match time::timeout(timeout, resolve(address, port)).await {
        Ok(addrs) => addrs?[0],
        Err(_) => return Err(PingError::Timeout(target_name)),
    };

    let local: SocketAddr = if target.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };
    let socket = UdpSocket::bind(local).await?;
    socket.connect(target).await?;

    let ping = UnconnectedPing::new(Utc::now().timestamp_millis());
    socket
        .send(&ping.to_bytes())
        .await
        .map_err(|e| unreachable_as_timeout(e, &target_name))?;

    let mut buf = vec![0u8; RECV_BUFFER_LEN];
    let len = time::timeout(timeout, socket.recv(&mut buf))
        .await
        .map_err(|_| PingError::Timeout(target_name.clone()))?
        .map_err(|e| unreachable_as_timeout(e, &target_name))?;

    let pong = UnconnectedPong::from_bytes(&buf[..len])?;
    debug!(
        log_type = LogType::Ping.as_str(),
        advertisement = %pong.advertisement,
        "Bedrock pong received"
    );
    Ok(normalize::from_bedrock(&pong.advertisement))
}

/// An ICMP port-unreachable surfaces as `ConnectionRefused` on a connected
/// UDP socket. For the caller it means the same as silence.
fn unreachable_as_timeout(err: io::Error, target: &str) -> PingError {
    if err.kind() == io::ErrorKind::ConnectionRefused {
        debug!(
            log_type = LogType::Ping.as_str(),
            target = %target,
            "Port unreachable"
        );
        PingError::Timeout(target.to_string())
    } else {
        PingError::Io(err)
    }
}
