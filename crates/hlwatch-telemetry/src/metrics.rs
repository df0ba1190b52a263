//! Prometheus metrics for hlwatch.
//!
//! Covers:
//! - Reconciliation cycles and their duration
//! - Account fetch failures
//! - Notification intents and delivery outcomes
//! - Tracked address count
//! - Chat commands
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. Registration only fails on a
//! duplicate metric name, which is a programming error surfaced on first use.

use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};

/// Completed reconciliation cycles.
pub static CYCLES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("hlwatch_cycles_total", "Completed reconciliation cycles").unwrap()
});

/// Reconciliation cycle duration in milliseconds.
pub static CYCLE_DURATION_MS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "hlwatch_cycle_duration_ms",
        "Reconciliation cycle duration in milliseconds",
        vec![50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 30000.0]
    )
    .unwrap()
});

/// Failed account fetches.
/// Labels: kind (network/http/decode/not_found/client)
pub static FETCH_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "hlwatch_fetch_errors_total",
        "Failed account snapshot fetches",
        &["kind"]
    )
    .unwrap()
});

/// Emitted notification intents.
/// Labels: kind (snapshot/opened/closed/address_error)
pub static INTENTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "hlwatch_intents_total",
        "Notification intents emitted by the reconciler",
        &["kind"]
    )
    .unwrap()
});

/// Notification delivery outcomes.
/// Labels: outcome (sent/failed)
pub static NOTIFICATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "hlwatch_notifications_total",
        "Chat notifications by delivery outcome",
        &["outcome"]
    )
    .unwrap()
});

/// Number of tracked addresses.
pub static TRACKED_ADDRESSES: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("hlwatch_tracked_addresses", "Number of tracked addresses").unwrap()
});

/// Processed chat commands.
/// Labels: command (add/list/remove/help/usage/unauthorized)
pub static COMMANDS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "hlwatch_commands_total",
        "Chat commands processed",
        &["command"]
    )
    .unwrap()
});

/// Supervised task restarts.
/// Labels: task
pub static TASK_RESTARTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "hlwatch_task_restarts_total",
        "Supervised loop restarts",
        &["task"]
    )
    .unwrap()
});

/// Metrics facade for easy access.
pub struct Metrics;

impl Metrics {
    /// Record a completed cycle.
    pub fn cycle_completed(duration_ms: f64) {
        CYCLES_TOTAL.inc();
        CYCLE_DURATION_MS.observe(duration_ms);
    }

    pub fn fetch_error(kind: &str) {
        FETCH_ERRORS_TOTAL.with_label_values(&[kind]).inc();
    }

    pub fn intent_emitted(kind: &str) {
        INTENTS_TOTAL.with_label_values(&[kind]).inc();
    }

    /// Record delivery counts of one dispatch.
    pub fn notifications(sent: usize, failed: usize) {
        NOTIFICATIONS_TOTAL
            .with_label_values(&["sent"])
            .inc_by(sent as u64);
        NOTIFICATIONS_TOTAL
            .with_label_values(&["failed"])
            .inc_by(failed as u64);
    }

    pub fn tracked_addresses(count: usize) {
        TRACKED_ADDRESSES.set(count as i64);
    }

    pub fn command(command: &str) {
        COMMANDS_TOTAL.with_label_values(&[command]).inc();
    }

    pub fn task_restarted(task: &str) {
        TASK_RESTARTS_TOTAL.with_label_values(&[task]).inc();
    }
}
