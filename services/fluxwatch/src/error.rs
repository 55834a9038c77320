//! Error types for the fluxwatch client

/// Errors that can occur while talking to the resource backend
#[derive(Debug, thiserror::Error)]
pub enum FluxwatchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The backend answered, but not with a success status
    #[error("{message} (status {status})")]
    Status { status: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid resource: {0}")]
    InvalidDraft(String),

    #[error("A create request is already in progress")]
    CreateInProgress,
}

impl FluxwatchError {
    /// Text shown to the user when an operation fails.
    ///
    /// Status failures collapse to their operation message; everything else
    /// uses the error's own text.
    pub fn user_message(&self) -> String {
        match self {
            FluxwatchError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for fluxwatch operations
pub type Result<T> = std::result::Result<T, FluxwatchError>;
