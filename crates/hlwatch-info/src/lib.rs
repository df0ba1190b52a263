//! Info API client and position normalization for hlwatch.
//!
//! Fetches account state (`clearinghouseState`) and mark prices
//! (`metaAndAssetCtxs`) from the Hyperliquid info endpoint, and turns the raw
//! position payloads into strongly typed [`hlwatch_core::Position`] values.

pub mod client;
pub mod error;
pub mod headers;
pub mod lenient;
pub mod normalize;
pub mod source;
pub mod types;

pub use client::{InfoClient, InfoRequest, DEFAULT_INFO_URL};
pub use error::{InfoError, InfoResult};
pub use lenient::{coerce_f64, LenientF64, LenientLeverage};
pub use normalize::{normalize, normalize_positions};
pub use source::{AccountSource, MarkPriceSource};
pub use types::{AccountSnapshot, AssetPositionEntry, ClearinghouseState, MarginSummary, RawPosition};
