pub mod error;
pub mod models;
pub mod provider;

pub use error::ConfigError;
pub use models::client::ClientConfig;
pub use models::logging::{LogType, LoggingConfig};
pub use models::server::{ServerConfig, ServerMode};
pub use models::serversee::ServerSeeConfig;
pub use provider::file::FileProvider;
