//! Concurrent delivery of one cycle's notifications.

use crate::render::MessageRenderer;
use crate::transport::ChatTransport;
use futures_util::future::join_all;
use hlwatch_info::MarkPriceSource;
use hlwatch_tracker::NotificationIntent;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Delivery counts of one dispatch, in messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub sent: usize,
    pub failed: usize,
}

impl DispatchSummary {
    fn record(&mut self, delivered: bool) {
        if delivered {
            self.sent += 1;
        } else {
            self.failed += 1;
        }
    }
}

impl std::ops::AddAssign for DispatchSummary {
    fn add_assign(&mut self, other: Self) {
        self.sent += other.sent;
        self.failed += other.failed;
    }
}

/// Renders intents and sends them to the notification chat.
///
/// Every send and every mark-price lookup is bounded by `send_timeout`; a
/// slow or failing delivery only affects its own message.
pub struct Dispatcher<T, P> {
    transport: Arc<T>,
    prices: Arc<P>,
    renderer: Arc<MessageRenderer>,
    chat_id: i64,
    send_timeout: Duration,
}

impl<T, P> Clone for Dispatcher<T, P> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            prices: Arc::clone(&self.prices),
            renderer: Arc::clone(&self.renderer),
            chat_id: self.chat_id,
            send_timeout: self.send_timeout,
        }
    }
}

impl<T: ChatTransport, P: MarkPriceSource> Dispatcher<T, P> {
    pub fn new(
        transport: Arc<T>,
        prices: Arc<P>,
        renderer: MessageRenderer,
        chat_id: i64,
        send_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            prices,
            renderer: Arc::new(renderer),
            chat_id,
            send_timeout,
        }
    }

    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    /// Deliver all intents concurrently.
    pub async fn dispatch(&self, intents: Vec<NotificationIntent>) -> DispatchSummary {
        if intents.is_empty() {
            return DispatchSummary::default();
        }

        let outcomes = join_all(intents.iter().map(|intent| self.deliver(intent))).await;
        let mut summary = DispatchSummary::default();
        for outcome in outcomes {
            summary += outcome;
        }
        debug!(sent = summary.sent, failed = summary.failed, "Dispatched notifications");
        summary
    }

    /// Send every message of one intent, in order. A failed part does not
    /// stop the remaining ones.
    async fn deliver(&self, intent: &NotificationIntent) -> DispatchSummary {
        let mark_price = match intent {
            NotificationIntent::PositionClosed { position, .. } => {
                Some(self.lookup_mark_price(&position.symbol).await)
            }
            _ => None,
        };

        let mut summary = DispatchSummary::default();
        for text in self.renderer.render(intent, mark_price.as_deref()) {
            summary.record(self.send(self.chat_id, &text).await);
        }
        summary
    }

    /// Mark price of `symbol`, or the error text when the lookup fails.
    async fn lookup_mark_price(&self, symbol: &str) -> String {
        match timeout(self.send_timeout, self.prices.fetch_mark_price(symbol)).await {
            Ok(Ok(price)) => price,
            Ok(Err(e)) => {
                warn!(symbol, error = %e, "Mark price lookup failed");
                e.to_string()
            }
            Err(_) => {
                warn!(symbol, "Mark price lookup timed out");
                format!(
                    "mark price lookup timed out after {}s",
                    self.send_timeout.as_secs()
                )
            }
        }
    }

    /// Send `text` to `chat_id`. Returns whether it was delivered.
    pub async fn send(&self, chat_id: i64, text: &str) -> bool {
        match timeout(self.send_timeout, self.transport.send_message(chat_id, text)).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(chat_id, error = %e, "Notification not delivered");
                false
            }
            Err(_) => {
                warn!(chat_id, "Notification send timed out");
                false
            }
        }
    }
}
