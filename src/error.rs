use thiserror::Error;

/// Result type for Lync 12 operations
pub type Result<T> = std::result::Result<T, HtdError>;

/// Errors that can occur when talking to a Lync 12 controller
#[derive(Error, Debug)]
pub enum HtdError {
    /// Zone number outside the range accepted by the operation
    #[error("Invalid zone: {0}")]
    InvalidZone(u8),

    /// Input number outside 1..=18
    #[error("Invalid source: {0}")]
    InvalidSource(u8),

    /// Volume percentage above 100
    #[error("Invalid volume: {0}")]
    InvalidVolume(u8),

    /// Source name not present in the configured source list
    #[error("Unknown source: {0}")]
    UnknownSource(String),

    /// No response within the receive timeout
    #[error("Request timeout")]
    Timeout,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl HtdError {
    /// Whether this error was raised by argument validation, before any I/O
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            HtdError::InvalidZone(_)
                | HtdError::InvalidSource(_)
                | HtdError::InvalidVolume(_)
                | HtdError::UnknownSource(_)
        )
    }
}
