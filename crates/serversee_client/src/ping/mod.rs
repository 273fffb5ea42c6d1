//! Direct status probes against the game server itself.

pub mod bedrock;
pub mod icon;
pub mod java;

use std::net::SocketAddr;

use tokio::net::lookup_host;

use crate::error::PingError;

pub const JAVA_DEFAULT_PORT: u16 = 25565;
pub const BEDROCK_DEFAULT_PORT: u16 = 19132;

/// Splits `host[:port]`, accepting bracketed IPv6 (`[::1]:19132`).
/// A bare IPv6 address without brackets is taken whole as the host.
pub fn split_host_port(input: &str, default_port: u16) -> Option<(String, u16)> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Some(rest) = input.strip_prefix('[') {
        let (host, tail) = rest.split_once(']')?;
        if host.is_empty() {
            return None;
        }
        let port = match tail {
            "" => default_port,
            _ => tail.strip_prefix(':')?.parse().ok()?,
        };
        return Some((host.to_string(), port));
    }

    match input.rsplit_once(':') {
        Some((host, _)) if host.contains(':') => Some((input.to_string(), default_port)),
        Some((host, port)) if !host.is_empty() => Some((host.to_string(), port.parse().ok()?)),
        Some(_) => None,
        None => Some((input.to_string(), default_port)),
    }
}

pub(crate) async fn resolve(address: &str, port: u16) -> Result<Vec<SocketAddr>, PingError> {
    let addrs: Vec<SocketAddr> = lookup_host((address, port))
        .await
        .map_err(|_| PingError::Resolve(address.to_string()))?
        .collect();
    if addrs.is_empty() {
        return Err(PingError::Resolve(address.to_string()));
    }
    Ok(addrs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_host_port() {
        assert_eq!(
            split_host_port("play.example.com", 25565),
            Some(("play.example.com".into(), 25565))
        );
        assert_eq!(
            split_host_port(" mc.example.com:25570 ", 25565),
            Some(("mc.example.com".into(), 25570))
        );
        assert_eq!(
            split_host_port("[::1]:19133", 19132),
            Some(("::1".into(), 19133))
        );
        assert_eq!(split_host_port("[::1]", 19132), Some(("::1".into(), 19132)));
        assert_eq!(
            split_host_port("fe80::1", 19132),
            Some(("fe80::1".into(), 19132))
        );
    }

    #[test]
    fn test_split_host_port_rejects_garbage() {
        assert_eq!(split_host_port("", 25565), None);
        assert_eq!(split_host_port("host:port", 25565), None);
        assert_eq!(split_host_port(":25565", 25565), None);
        assert_eq!(split_host_port("host:70000", 25565), None);
        assert_eq!(split_host_port("[::1", 25565), None);
        assert_eq!(split_host_port("[]:1", 25565), None);
    }
}
