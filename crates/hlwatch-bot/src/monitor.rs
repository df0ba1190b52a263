//! Reconciliation loop.

use hlwatch_info::{AccountSource, MarkPriceSource};
use hlwatch_notify::{ChatTransport, DispatchSummary, Dispatcher, MessageRenderer};
use hlwatch_registry::AddressRegistry;
use hlwatch_telemetry::Metrics;
use hlwatch_tracker::Reconciler;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Polls every tracked address on a fixed interval and dispatches the
/// resulting notifications.
///
/// Clones share the reconciler state, so a restarted loop continues from
/// the snapshots of the previous one.
pub struct Monitor<S, T, P> {
    reconciler: Arc<Mutex<Reconciler>>,
    source: Arc<S>,
    registry: Arc<AddressRegistry>,
    dispatcher: Dispatcher<T, P>,
    poll_interval: Duration,
}

impl<S, T, P> Clone for Monitor<S, T, P> {
    fn clone(&self) -> Self {
        Self {
            reconciler: Arc::clone(&self.reconciler),
            source: Arc::clone(&self.source),
            registry: Arc::clone(&self.registry),
            dispatcher: self.dispatcher.clone(),
            poll_interval: self.poll_interval,
        }
    }
}

impl<S, T, P> Monitor<S, T, P>
where
    S: AccountSource + 'static,
    T: ChatTransport + 'static,
    P: MarkPriceSource + 'static,
{
    pub fn new(
        reconciler: Reconciler,
        source: Arc<S>,
        registry: Arc<AddressRegistry>,
        dispatcher: Dispatcher<T, P>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            reconciler: Arc::new(Mutex::new(reconciler)),
            source,
            registry,
            dispatcher,
            poll_interval,
        }
    }

    /// Run one cycle over the current registry snapshot.
    ///
    /// Notifications are sent on a spawned task; the returned handle
    /// resolves once all of them were attempted.
    pub async fn run_cycle(&self) -> JoinHandle<DispatchSummary> {
        let users = self.registry.list();
        let report = {
            let mut reconciler = self.reconciler.lock().await;
            reconciler.run_cycle(self.source.as_ref(), &users).await
        };

        Metrics::tracked_addresses(users.len());
        Metrics::cycle_completed(report.elapsed.as_secs_f64() * 1000.0);
        for (user, kind) in &report.failures {
            warn!(user = %user, kind, "Address fetch failed this cycle");
            Metrics::fetch_error(kind);
        }
        for intent in &report.intents {
            Metrics::intent_emitted(intent.kind());
        }

        info!(
            addresses = users.len(),
            intents = report.intents.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Bot is still running"
        );

        let dispatcher = self.dispatcher.clone();
        let intents = report.intents;
        tokio::spawn(async move {
            let summary = dispatcher.dispatch(intents).await;
            Metrics::notifications(summary.sent, summary.failed);
            summary
        })
    }

    /// Cycle forever.
    pub async fn run(self) {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            "Starting reconciliation loop"
        );
        loop {
            // Dispatch runs detached; the next cycle does not wait for it.
            let _dispatch = self.run_cycle().await;
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Tell the notification chat that the loop failed and when it restarts.
    pub async fn report_failure(&self, reason: &str, retry_after: Duration) {
        let text = MessageRenderer::loop_failure(reason, retry_after);
        if !self.dispatcher.send(self.dispatcher.chat_id(), &text).await {
            warn!("Could not report loop failure to the chat");
        }
    }
}
