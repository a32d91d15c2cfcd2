use std::io;
use thiserror::Error;

/// Error type for the relay
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sampling unavailable: {0}")]
    SamplingUnavailable(String),

    #[error("Disk query failed: {0}")]
    DiskQueryFailed(String),

    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Gateway error: {0}")]
    Gateway(String),
}

/// Result type alias for the relay
pub type Result<T> = std::result::Result<T, RelayError>;

impl RelayError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        RelayError::Config(msg.into())
    }

    pub fn sampling_unavailable<S: Into<String>>(msg: S) -> Self {
        RelayError::SamplingUnavailable(msg.into())
    }

    pub fn disk_query_failed<S: Into<String>>(msg: S) -> Self {
        RelayError::DiskQueryFailed(msg.into())
    }

    pub fn channel_not_found<S: Into<String>>(msg: S) -> Self {
        RelayError::ChannelNotFound(msg.into())
    }

    pub fn send_failed<S: Into<String>>(msg: S) -> Self {
        RelayError::SendFailed(msg.into())
    }

    pub fn gateway<S: Into<String>>(msg: S) -> Self {
        RelayError::Gateway(msg.into())
    }
}
