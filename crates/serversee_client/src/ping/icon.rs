//! Icon lookup for statuses whose source carries none.
//!
//! Bedrock servers do not advertise an icon, but many also accept Java
//! clients (Geyser and similar), so a Java status ping often finds one.

use std::time::Duration;

use serversee_config::LogType;
use tracing::debug;

use super::{JAVA_DEFAULT_PORT, java, split_host_port};
use crate::model::ServerStatus;

/// Fills in `status.icon` after a successful Bedrock probe, if possible.
pub async fn with_fallback_icon(
    mut status: ServerStatus,
    address: &str,
    port: u16,
    timeout: Duration,
) -> ServerStatus {
    if status.icon.is_none() {
        status.icon = resolve_icon(address, port, timeout).await;
    }
    status
}

/// Tries the Java default port first, then the probed port, each with half
/// of `timeout`.
pub async fn resolve_icon(address: &str, port: u16, timeout: Duration) -> Option<String> {
    let half = timeout / 2;
    if let Some(icon) = java::fetch_favicon(address, JAVA_DEFAULT_PORT, half).await {
        return Some(icon);
    }
    if port != JAVA_DEFAULT_PORT {
        return java::fetch_favicon(address, port, half).await;
    }
    None
}

/// Looks the icon up on a separately configured public address.
pub async fn icon_from_address(server_address: &str, timeout: Duration) -> Option<String> {
    let Some((host, port)) = split_host_port(server_address, JAVA_DEFAULT_PORT) else {
        debug!(
            log_type = LogType::Ping.as_str(),
            server_address, "Unparsable icon address"
        );
        return None;
    };
    java::fetch_favicon(&host, port, timeout).await
}
