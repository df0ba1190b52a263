//! Chat side of hlwatch.
//!
//! - [`TelegramClient`]: Bot API `sendMessage` / `getUpdates`
//! - [`MessageRenderer`]: HTML text for each notification intent
//! - [`Dispatcher`]: renders and sends one cycle's intents concurrently
//! - [`BotCommand`]: parsing of the `/add`, `/list`, `/remove` commands

pub mod commands;
pub mod dispatcher;
pub mod error;
pub mod render;
pub mod telegram;
pub mod transport;

pub use commands::BotCommand;
pub use dispatcher::{DispatchSummary, Dispatcher};
pub use error::{NotifyError, NotifyResult};
pub use render::{escape_html, format_float, MessageRenderer, MAX_MESSAGE_LEN};
pub use telegram::{Chat, Message, TelegramClient, TelegramConfig, Update, User};
pub use transport::ChatTransport;
