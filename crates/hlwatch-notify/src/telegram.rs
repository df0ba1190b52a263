//! Telegram Bot API client.
//!
//! Only the two methods hlwatch needs are wrapped: `sendMessage` and
//! `getUpdates`. Every Bot API response is an envelope
//! `{"ok": bool, "result": ..., "description": ...}`; a non-ok envelope is
//! returned as [`NotifyError::Api`].
//!
//! The bot token is part of every request URL, so transport errors are
//! stripped of their URL before they are logged or returned.

use crate::error::{NotifyError, NotifyResult};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default Bot API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Extra time allowed on top of the long-poll timeout before the HTTP
/// request itself is abandoned.
const LONG_POLL_GRACE: Duration = Duration::from_secs(10);

/// Telegram client configuration.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Token from @BotFather.
    pub bot_token: String,
    /// Bot API base URL.
    pub api_base: String,
    /// `timeout` passed to `getUpdates`.
    pub long_poll_timeout: Duration,
    /// Request timeout for `sendMessage`.
    pub send_timeout: Duration,
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            long_poll_timeout: Duration::from_secs(60),
            send_timeout: Duration::from_secs(10),
        }
    }

    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    #[must_use]
    pub fn with_timeouts(mut self, long_poll: Duration, send: Duration) -> Self {
        self.long_poll_timeout = long_poll;
        self.send_timeout = send;
        self
    }
}

/// One inbound update.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

/// Message carried by an update.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

/// Sender of a message.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Bot API response envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: [&'static str; 1],
}

/// Telegram Bot API client.
#[derive(Clone)]
pub struct TelegramClient {
    config: TelegramConfig,
    client: Client,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_base", &self.config.api_base)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    pub fn new(config: TelegramConfig) -> NotifyResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.send_timeout)
            .build()
            .map_err(|e| NotifyError::HttpClient(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.bot_token,
            method
        )
    }

    /// Call a Bot API method and unwrap its envelope.
    async fn call<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
        timeout: Duration,
    ) -> NotifyResult<T> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.without_url().to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| NotifyError::Network(e.without_url().to_string()))?;

        let envelope: Envelope<T> = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(NotifyError::Api {
                    status: status.as_u16(),
                    description: String::from_utf8_lossy(&bytes).into_owned(),
                })
            }
            Err(e) => return Err(NotifyError::Decode(format!("{method}: {e}"))),
        };

        if !envelope.ok || !status.is_success() {
            return Err(NotifyError::Api {
                status: status.as_u16(),
                description: envelope.description.unwrap_or_default(),
            });
        }
        envelope
            .result
            .ok_or_else(|| NotifyError::Decode(format!("{method}: missing result")))
    }

    /// Send an HTML message with link previews disabled.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> NotifyResult<()> {
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        debug!(chat_id, len = text.len(), "Sending Telegram message");
        match self
            .call::<_, serde_json::Value>("sendMessage", &request, self.config.send_timeout)
            .await
        {
            Ok(_) => {
                debug!(chat_id, "Telegram message sent");
                Ok(())
            }
            Err(e) => {
                warn!(chat_id, error = %e, "Failed to send Telegram message");
                Err(e)
            }
        }
    }

    /// Long-poll for updates starting at `offset`.
    pub async fn get_updates(&self, offset: Option<i64>) -> NotifyResult<Vec<Update>> {
        let request = GetUpdatesRequest {
            offset,
            timeout: self.config.long_poll_timeout.as_secs(),
            allowed_updates: ["message"],
        };
        let updates: Vec<Update> = self
            .call(
                "getUpdates",
                &request,
                self.config.long_poll_timeout + LONG_POLL_GRACE,
            )
            .await?;

        if !updates.is_empty() {
            debug!(count = updates.len(), ?offset, "Received Telegram updates");
        }
        Ok(updates)
    }
}
