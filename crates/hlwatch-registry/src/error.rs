//! Registry error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    InvalidAddress(#[from] hlwatch_core::CoreError),

    #[error("Address already tracked: {0}")]
    Duplicate(String),

    #[error("Index {index} out of range (tracking {len} addresses)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RegistryError {
    /// Whether the error came from bad user input rather than storage.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidAddress(_) | Self::Duplicate(_) | Self::IndexOutOfRange { .. }
        )
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;
