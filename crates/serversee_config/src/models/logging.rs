use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub debug: bool,
    pub use_color: bool,
    pub show_timestamp: bool,
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            debug: false,
            use_color: true,
            show_timestamp: true,
            show_target: false,
        }
    }
}

/// Subsystem tag attached to every log event as the `log_type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogType {
    Ping,
    Transport,
    Registry,
    Monitor,
    Config,
    PublicApi,
}

impl LogType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LogType::Ping => "ping",
            LogType::Transport => "transport",
            LogType::Registry => "registry",
            LogType::Monitor => "monitor",
            LogType::Config => "config",
            LogType::PublicApi => "public_api",
        }
    }
}

impl std::fmt::Display for LogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
