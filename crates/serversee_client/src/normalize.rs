//! Conversion of every status source into a [`ServerStatus`].

use serde_json::Value;
use serversee_protocol::ProtocolError;
use serversee_protocol::minecraft::java::status::ResponseJSON;

use crate::error::{ClientError, Result};
use crate::model::ServerStatus;

const DEFAULT_MOTD: &str = "Minecraft Server";
const UNKNOWN: &str = "Unknown";
const DEFAULT_GAMEMODE: &str = "Survival";

/// Decodes the `data` of an agent `status` reply.
///
/// An explicit `online: false` means the agent is up but the game server is
/// not. A missing `online` flag is read as online, since the agent answered.
pub fn from_agent(data: &Value) -> Result<ServerStatus> {
    if data.get("online").and_then(Value::as_bool) == Some(false) {
        return Err(ClientError::ServerOffline);
    }
    if !data.is_object() {
        return Err(ClientError::Unsupported(format!(
            "agent status is not an object: {data}"
        )));
    }

    let mut status: ServerStatus = serde_json::from_value(data.clone())?;
    status.online = true;
    Ok(status)
}

/// Parses the JSON document of a Java status response.
pub fn from_java(json: &str) -> std::result::Result<ServerStatus, ProtocolError> {
    let response: ResponseJSON =
        serde_json::from_str(json).map_err(|e| ProtocolError::InvalidPayload(e.to_string()))?;
    Ok(from_java_response(&response))
}

pub fn from_java_response(response: &ResponseJSON) -> ServerStatus {
    let (players, max_players) = response
        .players
        .as_ref()
        .map(|p| (clamp_count(p.online), clamp_count(p.max)))
        .unwrap_or((0, 0));

    ServerStatus {
        online: true,
        motd: motd_from_description(&response.description),
        version: response
            .version
            .as_ref()
            .and_then(|v| v.name.clone())
            .unwrap_or_else(|| UNKNOWN.to_string()),
        bukkit_version: String::new(),
        players,
        max_players,
        gamemode: DEFAULT_GAMEMODE.to_string(),
        plugins: Vec::new(),
        icon: response.favicon.clone(),
    }
}

/// Builds a status from a Bedrock advertisement:
/// `edition;motd;protocol;version;online;max;guid;motd2;gamemode;...`
pub fn from_bedrock(text: &str) -> ServerStatus {
    let parts: Vec<&str> = text.split(';').collect();
    let field = |index: usize| parts.get(index).copied();
    let count = |index: usize| field(index).and_then(|s| s.trim().parse().ok()).unwrap_or(0);

    ServerStatus {
        online: true,
        motd: field(1).unwrap_or(DEFAULT_MOTD).to_string(),
        version: field(3).unwrap_or(UNKNOWN).to_string(),
        bukkit_version: String::new(),
        players: count(4),
        max_players: count(5),
        gamemode: field(8).unwrap_or(DEFAULT_GAMEMODE).to_string(),
        plugins: Vec::new(),
        icon: None,
    }
}

/// Normalises a response of the public status API (api.mcsrvstat.us, v3).
pub fn from_public_api(json: &Value) -> Result<ServerStatus> {
    if !json.get("online").and_then(Value::as_bool).unwrap_or(false) {
        return Err(ClientError::ServerOffline);
    }

    let motd = json
        .pointer("/motd/clean/0")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_MOTD);
    let count = |pointer: &str| {
        json.pointer(pointer)
            .and_then(Value::as_i64)
            .map(clamp_count)
            .unwrap_or(0)
    };

    Ok(ServerStatus {
        online: true,
        motd: motd.to_string(),
        version: json
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN)
            .to_string(),
        bukkit_version: UNKNOWN.to_string(),
        players: count("/players/online"),
        max_players: count("/players/max"),
        gamemode: UNKNOWN.to_string(),
        plugins: Vec::new(),
        icon: json.get("icon").and_then(Value::as_str).map(String::from),
    })
}

/// Flattens a chat component into its text.
///
/// Only the top level and one level of `extra` are read: object fragments
/// contribute their `text`, string fragments themselves.
pub fn motd_from_description(description: &Value) -> String {
    match description {
        Value::String(text) => text.clone(),
        Value::Object(component) => {
            let mut motd = String::new();
            if let Some(text) = component.get("text").and_then(Value::as_str) {
                motd.push_str(text);
            }
            if let Some(extra) = component.get("extra").and_then(Value::as_array) {
                for fragment in extra {
                    match fragment {
                        Value::String(text) => motd.push_str(text),
                        Value::Object(inner) => {
                            if let Some(text) = inner.get("text").and_then(Value::as_str) {
                                motd.push_str(text);
                            }
                        }
                        _ => {}
                    }
                }
            }
            motd
        }
        _ => String::new(),
    }
}

fn clamp_count(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
