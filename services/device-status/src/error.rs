//! Error types for the device status service

/// Errors that can occur in the device status service
#[derive(Debug, thiserror::Error)]
pub enum DeviceStatusError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("{message}")]
    Tool { tool: String, message: String },

    #[error("No authentication token available")]
    MissingToken,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for device status operations
pub type Result<T> = std::result::Result<T, DeviceStatusError>;
