use thiserror::Error;

/// Main error type for hypersockets
#[derive(Error, Debug)]
pub enum HyperSocketError {
    /// Connection closed unexpectedly
    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    /// Channel send error
    #[error("Channel send error: {0}")]
    ChannelSend(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for hypersockets operations
pub type Result<T> = std::result::Result<T, HyperSocketError>;
