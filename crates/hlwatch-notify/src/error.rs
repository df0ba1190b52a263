//! Notification error types.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Telegram API error ({status}): {description}")]
    Api { status: u16, description: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Timed out after {0}s")]
    Timeout(u64),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl NotifyError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Api { .. } => "api",
            Self::Decode(_) => "decode",
            Self::HttpClient(_) => "client",
            Self::Timeout(_) => "timeout",
            Self::Config(_) => "config",
        }
    }
}

pub type NotifyResult<T> = Result<T, NotifyError>;
