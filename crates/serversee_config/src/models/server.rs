use serde::{Deserialize, Serialize};

/// How a server's status is obtained.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash, Default)]
pub enum ServerMode {
    /// Through the companion agent over its WebSocket API.
    #[serde(rename = "agent_api", alias = "API")]
    #[default]
    AgentApi,
    #[serde(rename = "java_direct", alias = "JAVA_ADDRESS")]
    JavaDirect,
    #[serde(rename = "bedrock_direct", alias = "BEDROCK_ADDRESS")]
    BedrockDirect,
}

impl ServerMode {
    pub fn default_port(&self) -> u16 {
        match self {
            ServerMode::AgentApi | ServerMode::JavaDirect => 25565,
            ServerMode::BedrockDirect => 19132,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default)]
    pub name: String,

    /// Agent base URL in agent mode, `host[:port]` otherwise.
    pub endpoint: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,

    /// Public game address, used for the icon lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_address: Option<String>,

    #[serde(default)]
    pub use_address_for_icon: bool,

    #[serde(default)]
    pub mode: ServerMode,
}

impl ServerConfig {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, mode: ServerMode) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            credential: None,
            server_address: None,
            use_address_for_icon: false,
            mode,
        }
    }

    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    pub fn with_server_address(mut self, address: impl Into<String>, use_for_icon: bool) -> Self {
        self.server_address = Some(address.into());
        self.use_address_for_icon = use_for_icon;
        self
    }

    /// The credential, treating an empty string as absent.
    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref().filter(|c| !c.is_empty())
    }

    /// Address used for the icon lookup, when configured to do so.
    pub fn icon_address(&self) -> Option<&str> {
        if !self.use_address_for_icon {
            return None;
        }
        self.server_address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }

    /// Name used in logs and snapshots; falls back to the endpoint.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.endpoint
        } else {
            &self.name
        }
    }
}
