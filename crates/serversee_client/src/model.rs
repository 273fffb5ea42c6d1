use serde::{Deserialize, Serialize};

/// Canonical status snapshot, whatever source produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerStatus {
    #[serde(default)]
    pub online: bool,
    /// May contain `§` or `&` formatting codes.
    #[serde(default)]
    pub motd: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub bukkit_version: String,
    #[serde(default)]
    pub players: u32,
    #[serde(default)]
    pub max_players: u32,
    #[serde(default)]
    pub gamemode: String,
    #[serde(default)]
    pub plugins: Vec<String>,
    /// Base64 PNG, usually as a `data:image/png;base64,` URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerMetrics {
    #[serde(default)]
    pub tps_5s: f64,
    #[serde(default)]
    pub tps_1m: f64,
    #[serde(default)]
    pub mspt: f64,
    #[serde(default)]
    pub cpu_process: f64,
    #[serde(default)]
    pub cpu_system: f64,
    #[serde(default)]
    pub mem_used: f64,
    #[serde(default)]
    pub mem_total: f64,
    #[serde(default)]
    pub mem_max: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_mem_used: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_mem_total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_used: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_total: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhitelistResponse {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub players: Vec<String>,
}
