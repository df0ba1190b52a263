//! Telegram command loop.
//!
//! Admin chats manage the tracked address list with `/add`, `/list` and
//! `/remove`. Updates are handled strictly in arrival order and the
//! `getUpdates` offset only moves past a batch once every update in it was
//! handled. Handlers write the address file synchronously, so they run on the
//! blocking pool.

use hlwatch_notify::{escape_html, BotCommand, ChatTransport, NotifyResult, Update};
use hlwatch_registry::{AddressRegistry, RegistryError};
use hlwatch_telemetry::Metrics;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

pub const UNAUTHORIZED_REPLY: &str = "You are not authorized to use this command.";

/// Executes parsed commands against the registry.
#[derive(Debug, Clone)]
pub struct CommandHandler {
    registry: Arc<AddressRegistry>,
    admins: HashSet<i64>,
}

impl CommandHandler {
    pub fn new(registry: Arc<AddressRegistry>, admins: impl IntoIterator<Item = i64>) -> Self {
        Self {
            registry,
            admins: admins.into_iter().collect(),
        }
    }

    pub fn is_authorized(&self, chat_id: i64) -> bool {
        self.admins.contains(&chat_id)
    }

    /// Reply for `text` sent from `chat_id`, or `None` when nothing should
    /// be sent back.
    pub fn handle_text(&self, chat_id: i64, text: &str) -> Option<String> {
        if !self.is_authorized(chat_id) {
            warn!(chat_id, "Command from unauthorized chat");
            Metrics::command("unauthorized");
            return Some(UNAUTHORIZED_REPLY.to_string());
        }

        let command = BotCommand::parse(text);
        Metrics::command(command.name());
        debug!(chat_id, command = command.name(), "Handling command");

        match command {
            BotCommand::Add(raw) => Some(self.add(&raw)),
            BotCommand::List => Some(self.list()),
            BotCommand::Remove(index) => Some(self.remove(index)),
            BotCommand::Help => Some(BotCommand::help_text().to_string()),
            BotCommand::Usage(usage) => Some(usage.to_string()),
            BotCommand::Unknown(_) => None,
        }
    }

    fn add(&self, raw: &str) -> String {
        let shown = escape_html(raw);
        match self.registry.add(raw) {
            Ok(address) => {
                Metrics::tracked_addresses(self.registry.len());
                format!("Added {address}")
            }
            Err(RegistryError::InvalidAddress(_)) => {
                format!("Failed to add {shown}. Address is invalid.")
            }
            Err(RegistryError::Duplicate(_)) => {
                format!("Failed to add {shown}. Address is already tracked.")
            }
            Err(e) => {
                warn!(error = %e, "Failed to persist address list");
                format!("Failed to add {shown}. Could not save the address list.")
            }
        }
    }

    fn list(&self) -> String {
        let addresses = self.registry.list();
        if addresses.is_empty() {
            return "Address list is empty.".to_string();
        }
        addresses
            .iter()
            .enumerate()
            .fold("Tracked addresses:\n".to_string(), |mut out, (i, address)| {
                out.push_str(&format!("{i}. {address}\n"));
                out
            })
    }

    fn remove(&self, index: usize) -> String {
        match self.registry.remove_at(index) {
            Ok(removed) => {
                info!(index, address = %removed, "Address removed by command");
                Metrics::tracked_addresses(self.registry.len());
                format!("Removed address at number {index}")
            }
            Err(e) if e.is_rejection() => format!("Failed to remove. Number {index} is invalid."),
            Err(e) => {
                warn!(error = %e, "Failed to persist address list");
                format!("Failed to remove number {index}. Could not save the address list.")
            }
        }
    }
}

/// Long-polls the bot for commands.
pub struct CommandLoop<T> {
    transport: Arc<T>,
    handler: Arc<CommandHandler>,
    offset: Arc<Mutex<Option<i64>>>,
    poll_interval: Duration,
    retry_delay: Duration,
    send_timeout: Duration,
}

impl<T> Clone for CommandLoop<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            handler: Arc::clone(&self.handler),
            offset: Arc::clone(&self.offset),
            poll_interval: self.poll_interval,
            retry_delay: self.retry_delay,
            send_timeout: self.send_timeout,
        }
    }
}

impl<T: ChatTransport + 'static> CommandLoop<T> {
    pub fn new(
        transport: Arc<T>,
        handler: CommandHandler,
        poll_interval: Duration,
        retry_delay: Duration,
        send_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            handler: Arc::new(handler),
            offset: Arc::new(Mutex::new(None)),
            poll_interval,
            retry_delay,
            send_timeout,
        }
    }

    /// Next `getUpdates` offset.
    pub fn offset(&self) -> Option<i64> {
        *self.offset.lock()
    }

    /// Fetch and handle one batch of updates. Returns how many were handled.
    pub async fn poll_once(&self) -> NotifyResult<usize> {
        let offset = self.offset();
        let updates = self.transport.get_updates(offset).await?;
        let Some(last_id) = updates.iter().map(|u| u.update_id).max() else {
            return Ok(0);
        };

        for update in &updates {
            self.handle_update(update).await;
        }

        *self.offset.lock() = Some(last_id + 1);
        Ok(updates.len())
    }

    async fn handle_update(&self, update: &Update) {
        let Some(message) = &update.message else {
            return;
        };
        let chat_id = message.chat.id;
        let text = message.text.clone().unwrap_or_default();

        let handler = Arc::clone(&self.handler);
        let handled = tokio::task::spawn_blocking(move || handler.handle_text(chat_id, &text)).await;
        let reply = match handled {
            Ok(Some(reply)) => reply,
            Ok(None) => return,
            Err(e) => {
                warn!(chat_id, update_id = update.update_id, error = %e, "Command handler failed");
                return;
            }
        };
        match timeout(self.send_timeout, self.transport.send_message(chat_id, &reply)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(chat_id, update_id = update.update_id, error = %e, "Reply not delivered"),
            Err(_) => warn!(chat_id, update_id = update.update_id, "Reply timed out"),
        }
    }

    /// Poll forever.
    pub async fn run(self) {
        info!(
            interval_ms = self.poll_interval.as_millis() as u64,
            "Starting command loop"
        );
        loop {
            match self.poll_once().await {
                Ok(_) => tokio::time::sleep(self.poll_interval).await,
                Err(e) => {
                    warn!(error = %e, retry_in_secs = self.retry_delay.as_secs(), "Telegram polling failed");
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }
}
