//! Prometheus metrics and structured logging for hlwatch.
//!
//! - `init_logging`: tracing subscriber (JSON in production, pretty otherwise)
//! - `Metrics`: facade over the process-wide Prometheus collectors
//! - `serve_metrics`: optional `/metrics` endpoint

pub mod error;
pub mod logging;
pub mod metrics;
pub mod server;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
pub use server::{metrics_router, render_metrics, serve_metrics, serve_metrics_on};
