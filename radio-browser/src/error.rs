//! Error types for the Radio Browser client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while discovering servers or calling the API
#[derive(Debug, Error)]
pub enum Error {
    /// Server discovery failed (bad request, resolver failure or bad response)
    #[error("server discovery failed: {0}")]
    Discovery(#[from] radio_dns::Error),

    /// No server is available: discovery has not run or found nothing
    #[error("no Radio Browser servers available")]
    NoServersAvailable,

    /// An API request URL could not be built
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// HTTP transport error while calling the API
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// API response did not match the expected record shape
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Failed to parse configuration file
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if the caller may retry the operation later
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Discovery(e) => e.is_retryable(),
            Error::NoServersAvailable | Error::Transport(_) => true,
            _ => false,
        }
    }

    /// Check if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::Config(_) | Error::ConfigParse(_) | Error::Discovery(radio_dns::Error::Config(_))
        )
    }
}
