//! Error types for rancp

use thiserror::Error;

/// Error types for the rancp library.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Protocol-related errors.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Message codec errors.
    #[error("Codec error: {0}")]
    Codec(String),

    /// Transport association errors.
    #[error("Transport error: {0}")]
    Transport(String),

    /// YAML parsing errors.
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}
