use std::{fs, path::Path};

use tracing::{debug, instrument};

use crate::{ConfigError, LogType, ServerSeeConfig};

pub struct FileProvider;

impl FileProvider {
    pub const DEFAULT_PATH: &'static str = "serversee.yml";

    /// Reads, parses and validates a YAML configuration file.
    #[instrument(
        name = "file_provider: load_config",
        skip(path),
        fields(path = %path.as_ref().display())
    )]
    pub fn try_load_config(path: impl AsRef<Path>) -> Result<ServerSeeConfig, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        let config = Self::parse(&content)?;
        debug!(
            log_type = LogType::Config.as_str(),
            servers = config.servers.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<ServerSeeConfig, ConfigError> {
        // An empty file deserializes to null
        if content.trim().is_empty() {
            return Ok(ServerSeeConfig::default());
        }
        let config: ServerSeeConfig = serde_yml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}
