//! Per-address position reconciliation for hlwatch.
//!
//! Each poll cycle the [`Reconciler`] compares every tracked address's fresh
//! position set with the one it saw last time and emits
//! [`NotificationIntent`]s:
//! - first successful poll of an address: one `SnapshotReport`
//! - afterwards: `PositionOpened` / `PositionClosed` per symbol difference
//! - fetch failure: one `AddressError`, state left untouched

pub mod diff;
pub mod intent;
pub mod reconciler;
pub mod state;

pub use diff::SnapshotDiff;
pub use intent::NotificationIntent;
pub use reconciler::{CycleReport, Reconciler, DEFAULT_FETCH_CONCURRENCY};
pub use state::AddressPhase;
