use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO Error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse Error: {0}")]
    Parse(#[from] serde_yml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
