//! Bot command parsing.
//!
//! - `/add <address>` - start tracking an address
//! - `/list` - show tracked addresses with their index
//! - `/remove <index>` - stop tracking the address at `index`
//! - `/help` (or `/start`) - usage

/// Usage line for `/add`.
pub const ADD_USAGE: &str = "Invalid format. Use: /add <user_address>";
/// Usage line for `/remove`.
pub const REMOVE_USAGE: &str = "Invalid format. Use: /remove <number>";

/// Parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// Address argument, not yet validated.
    Add(String),
    List,
    /// Zero-based index as shown by `/list`.
    Remove(usize),
    Help,
    /// Known command with a missing or malformed argument.
    Usage(&'static str),
    /// Anything else; ignored.
    Unknown(String),
}

impl BotCommand {
    /// Parse a message text.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let Some(body) = text.strip_prefix('/') else {
            return Self::Unknown(text.to_string());
        };

        let (head, rest) = match body.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (body, ""),
        };
        // `/add@my_bot` in group chats.
        let name = head.split('@').next().unwrap_or(head).to_lowercase();

        match name.as_str() {
            "add" if rest.is_empty() => Self::Usage(ADD_USAGE),
            "add" => Self::Add(rest.to_string()),
            "list" => Self::List,
            "remove" => match rest {
                digits if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => digits
                    .parse()
                    .map_or(Self::Usage(REMOVE_USAGE), Self::Remove),
                _ => Self::Usage(REMOVE_USAGE),
            },
            "help" | "start" => Self::Help,
            _ => Self::Unknown(text.to_string()),
        }
    }

    /// Command name for logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::List => "list",
            Self::Remove(_) => "remove",
            Self::Help => "help",
            Self::Usage(_) => "usage",
            Self::Unknown(_) => "unknown",
        }
    }

    /// Help text listing every command.
    pub fn help_text() -> &'static str {
        "<b>Commands</b>\n\
         /add &lt;user_address&gt; - track an address\n\
         /list - show tracked addresses\n\
         /remove &lt;number&gt; - stop tracking the address at that number\n\
         /help - show this message"
    }
}
