//! Hyperliquid position watcher.
//!
//! Runs two supervised loops that share only the address registry:
//! - reconciliation: polls every tracked address, diffs positions and
//!   notifies the Telegram chat
//! - commands: long-polls Telegram for `/add`, `/list`, `/remove`

pub mod app;
pub mod commands;
pub mod config;
pub mod error;
pub mod monitor;
pub mod setup;
pub mod supervisor;

#[cfg(test)]
mod test_support;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
