use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{client::ClientConfig, logging::LoggingConfig, server::ServerConfig};
use crate::ConfigError;

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct ServerSeeConfig {
    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub servers: Vec<ServerConfig>,
}

impl ServerSeeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.client.validate().map_err(ConfigError::Invalid)?;

        let mut names = HashSet::new();
        for (index, server) in self.servers.iter().enumerate() {
            if server.endpoint.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "servers[{index}] has an empty endpoint"
                )));
            }
            // Unnamed servers go by their endpoint.
            if !names.insert(server.display_name()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate server name '{}'",
                    server.display_name()
                )));
            }
        }
        Ok(())
    }

    pub fn server(&self, name: &str) -> Option<&ServerConfig> {
        self.servers.iter().find(|s| s.display_name() == name)
    }
}
