//! Application configuration.

use crate::error::{AppError, AppResult};
use hlwatch_info::DEFAULT_INFO_URL;
use hlwatch_notify::TelegramConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding `telegram.bot_token`.
pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Telegram settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramSettings {
    /// Token from @BotFather (`<id>:<secret>`).
    #[serde(default)]
    pub bot_token: String,
    /// Chat that receives position notifications.
    #[serde(default)]
    pub chat_id: i64,
    /// Chat ids allowed to run commands.
    #[serde(default)]
    pub admins: Vec<i64>,
    /// Bot API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Pause between `getUpdates` calls (ms). Default: 1,000.
    #[serde(default = "default_command_poll_interval_ms")]
    pub command_poll_interval_ms: u64,
    /// Pause after a failed `getUpdates` (seconds). Default: 10.
    #[serde(default = "default_command_retry_delay_secs")]
    pub command_retry_delay_secs: u64,
    /// `getUpdates` long-poll timeout (seconds). Default: 60.
    #[serde(default = "default_long_poll_timeout_secs")]
    pub long_poll_timeout_secs: u64,
    /// Bound on each send and mark-price lookup (seconds). Default: 10.
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
}

fn default_api_base() -> String {
    hlwatch_notify::telegram::DEFAULT_API_BASE.to_string()
}

fn default_command_poll_interval_ms() -> u64 {
    1_000
}

fn default_command_retry_delay_secs() -> u64 {
    10
}

fn default_long_poll_timeout_secs() -> u64 {
    60
}

fn default_send_timeout_secs() -> u64 {
    10
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: 0,
            admins: Vec::new(),
            api_base: default_api_base(),
            command_poll_interval_ms: default_command_poll_interval_ms(),
            command_retry_delay_secs: default_command_retry_delay_secs(),
            long_poll_timeout_secs: default_long_poll_timeout_secs(),
            send_timeout_secs: default_send_timeout_secs(),
        }
    }
}

impl fmt::Debug for TelegramSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramSettings")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("admins", &self.admins)
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl TelegramSettings {
    pub fn command_poll_interval(&self) -> Duration {
        Duration::from_millis(self.command_poll_interval_ms)
    }

    pub fn command_retry_delay(&self) -> Duration {
        Duration::from_secs(self.command_retry_delay_secs)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }

    /// Client configuration for [`hlwatch_notify::TelegramClient`].
    pub fn client_config(&self) -> TelegramConfig {
        TelegramConfig::new(self.bot_token.clone())
            .with_api_base(self.api_base.clone())
            .with_timeouts(
                Duration::from_secs(self.long_poll_timeout_secs),
                self.send_timeout(),
            )
    }
}

/// Metrics endpoint settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Port for the `/metrics` endpoint; disabled when absent.
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Info endpoint URL.
    #[serde(default = "default_info_url")]
    pub info_url: String,
    /// JSON file holding the tracked addresses.
    #[serde(default = "default_addresses_path")]
    pub addresses_path: PathBuf,
    /// Reconciliation interval (seconds). Default: 60.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Account fetches in flight per cycle. Default: 4.
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
    /// Delay before a failed loop is restarted (seconds). Default: 60.
    #[serde(default = "default_error_retry_delay_secs")]
    pub error_retry_delay_secs: u64,
    /// UTC offset used for timestamps in messages. Default: 7.
    #[serde(default = "default_display_utc_offset_hours")]
    pub display_utc_offset_hours: i32,
    /// Profile link; `{address}` is replaced by the address.
    #[serde(default = "default_profile_url_template")]
    pub profile_url_template: String,
    /// Extra or replacement headers for info requests.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub info_headers: BTreeMap<String, String>,
    #[serde(default)]
    pub telegram: TelegramSettings,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

fn default_info_url() -> String {
    DEFAULT_INFO_URL.to_string()
}

fn default_addresses_path() -> PathBuf {
    PathBuf::from("user_addresses.json")
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_fetch_concurrency() -> usize {
    hlwatch_tracker::DEFAULT_FETCH_CONCURRENCY
}

fn default_error_retry_delay_secs() -> u64 {
    60
}

fn default_display_utc_offset_hours() -> i32 {
    7
}

fn default_profile_url_template() -> String {
    "https://hyperdash.info/trader/{address}".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            info_url: default_info_url(),
            addresses_path: default_addresses_path(),
            poll_interval_secs: default_poll_interval_secs(),
            fetch_concurrency: default_fetch_concurrency(),
            error_retry_delay_secs: default_error_retry_delay_secs(),
            display_utc_offset_hours: default_display_utc_offset_hours(),
            profile_url_template: default_profile_url_template(),
            info_headers: BTreeMap::new(),
            telegram: TelegramSettings::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parse a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config {}: {e}", path.display()))
        })?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Read the file, apply environment overrides and validate.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_token_override(std::env::var(BOT_TOKEN_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Replace the bot token when `token` is set and non-empty.
    pub fn apply_token_override(&mut self, token: Option<String>) {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.telegram.bot_token = token.trim().to_string();
        }
    }

    /// Reject configurations the process cannot run with.
    pub fn validate(&self) -> AppResult<()> {
        crate::setup::validate_bot_token(&self.telegram.bot_token)
            .map_err(|e| AppError::Config(format!("telegram.bot_token: {e}")))?;
        if self.telegram.chat_id == 0 {
            return Err(AppError::Config(
                "telegram.chat_id is missing or zero".to_string(),
            ));
        }
        if self.telegram.admins.is_empty() {
            return Err(AppError::Config(
                "telegram.admins must list at least one chat id".to_string(),
            ));
        }
        if self.poll_interval_secs == 0 {
            return Err(AppError::Config("poll_interval_secs must be > 0".to_string()));
        }
        if self.fetch_concurrency == 0 {
            return Err(AppError::Config("fetch_concurrency must be > 0".to_string()));
        }
        if !(-12..=14).contains(&self.display_utc_offset_hours) {
            return Err(AppError::Config(format!(
                "display_utc_offset_hours out of range: {}",
                self.display_utc_offset_hours
            )));
        }
        Ok(())
    }

    pub fn info_header_overrides(&self) -> Vec<(&str, &str)> {
        self.info_headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn error_retry_delay(&self) -> Duration {
        Duration::from_secs(self.error_retry_delay_secs)
    }
}
