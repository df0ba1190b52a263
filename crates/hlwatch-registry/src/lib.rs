//! Tracked address registry for hlwatch.
//!
//! The registry is the only state shared between the reconciliation loop
//! and the command loop. Reads and mutations are serialized by one lock,
//! and every mutation rewrites the backing JSON file before the in-memory
//! list changes.

pub mod error;
pub mod registry;
pub mod store;

pub use error::{RegistryError, RegistryResult};
pub use registry::AddressRegistry;
pub use store::AddressFile;
