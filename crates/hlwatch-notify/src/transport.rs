//! Chat transport abstraction.

use crate::error::NotifyResult;
use crate::telegram::{TelegramClient, Update};
use std::future::Future;

/// Outbound messages and inbound updates of a chat bot.
pub trait ChatTransport: Send + Sync {
    /// Send an HTML message to `chat_id` with link previews disabled.
    fn send_message(&self, chat_id: i64, text: &str) -> impl Future<Output = NotifyResult<()>> + Send;

    /// Long-poll for updates with `update_id >= offset`.
    fn get_updates(&self, offset: Option<i64>) -> impl Future<Output = NotifyResult<Vec<Update>>> + Send;
}

impl ChatTransport for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> NotifyResult<()> {
        TelegramClient::send_message(self, chat_id, text).await
    }

    async fn get_updates(&self, offset: Option<i64>) -> NotifyResult<Vec<Update>> {
        TelegramClient::get_updates(self, offset).await
    }
}
