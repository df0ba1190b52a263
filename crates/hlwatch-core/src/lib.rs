//! Core domain types for the hlwatch position watcher.
//!
//! This crate provides the types shared by every other crate:
//! - `UserAddress`: A validated on-chain account address
//! - `Position`: One open perp exposure, normalized from the info API
//! - `PositionSet`: An address's positions at one poll, keyed by symbol

pub mod address;
pub mod error;
pub mod position;

pub use address::UserAddress;
pub use error::{CoreError, Result};
pub use position::{estimated_entry_size, round2, Position, PositionSet, PositionSide};
