//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Info API error: {0}")]
    Info(#[from] hlwatch_info::InfoError),

    #[error("Registry error: {0}")]
    Registry(#[from] hlwatch_registry::RegistryError),

    #[error("Notification error: {0}")]
    Notify(#[from] hlwatch_notify::NotifyError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] hlwatch_telemetry::TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
