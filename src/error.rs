//! Error handling for the FallWatch client

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
///
/// Three families matter to callers: `Validation` never reaches the network,
/// `Connectivity`/`Channel` are transport failures, and `Rejected` carries the
/// backend's own refusal message (HTTP 200 with `success: false`, or a
/// non-2xx status with a detail body). All messages are user-presentable
/// free text.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Client-side field check failed before submission
    #[error("Validation error: {0}")]
    Validation(String),

    /// HTTP transport failure (connect, timeout, decode)
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// Backend refused the request
    #[error("{0}")]
    Rejected(String),

    /// Alert channel transport failure
    #[error("Alert channel error: {0}")]
    Channel(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Config error
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Connectivity(e.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::Channel(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_displays_bare_message() {
        let err = Error::Rejected("Camera not found".to_string());
        assert_eq!(err.to_string(), "Camera not found");
    }

    #[test]
    fn test_validation_is_prefixed() {
        let err = Error::Validation("Camera name is required".to_string());
        assert_eq!(err.to_string(), "Validation error: Camera name is required");
    }
}
