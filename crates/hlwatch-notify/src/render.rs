//! HTML message rendering.
//!
//! Output uses Telegram's HTML parse mode. Values that come from outside
//! (error descriptions, mark prices) are escaped; numbers are printed the
//! way the upstream floats read in a terminal (`10.0`, `-12.5`).

use crate::error::{NotifyError, NotifyResult};
use chrono::{DateTime, FixedOffset, Utc};
use hlwatch_core::{Position, UserAddress};
use hlwatch_tracker::NotificationIntent;
use std::time::Duration;

/// Placeholder replaced by the address in the profile URL template.
pub const ADDRESS_PLACEHOLDER: &str = "{address}";

/// Longest text `sendMessage` accepts, in UTF-16 code units.
pub const MAX_MESSAGE_LEN: usize = 4096;

const RULE: &str = "------------------------------";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a float with at least one decimal place.
///
/// Whole numbers keep a trailing `.0`; everything else uses the shortest
/// representation that round-trips.
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Escape `&`, `<` and `>` for Telegram HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Length as Telegram counts it. Markup is included, so this never
/// undercounts.
fn message_len(text: &str) -> usize {
    text.encode_utf16().count()
}

fn pnl_emoji(position: &Position) -> &'static str {
    if position.is_in_profit() {
        "🟢"
    } else {
        "🔴"
    }
}

/// Renders notification intents to chat messages.
#[derive(Debug, Clone)]
pub struct MessageRenderer {
    offset: FixedOffset,
    offset_hours: i32,
    profile_url_template: String,
}

impl MessageRenderer {
    /// `utc_offset_hours` is the zone timestamps are shown in.
    pub fn new(utc_offset_hours: i32, profile_url_template: impl Into<String>) -> NotifyResult<Self> {
        let offset = FixedOffset::east_opt(utc_offset_hours * 3600).ok_or_else(|| {
            NotifyError::Config(format!("UTC offset out of range: {utc_offset_hours}"))
        })?;
        Ok(Self {
            offset,
            offset_hours: utc_offset_hours,
            profile_url_template: profile_url_template.into(),
        })
    }

    pub fn profile_url(&self, user: &UserAddress) -> String {
        self.profile_url_template
            .replace(ADDRESS_PLACEHOLDER, user.as_str())
    }

    /// `2024-05-01 19:30:00 (UTC+7)`
    fn timestamp(&self, at: DateTime<Utc>) -> String {
        format!(
            "{} (UTC{:+})",
            at.with_timezone(&self.offset).format(TIME_FORMAT),
            self.offset_hours
        )
    }

    fn header(user: &UserAddress) -> String {
        format!("⚠️ [<b>{}</b>]\n", user.short())
    }

    fn position_line(position: &Position) -> String {
        format!(
            "{} {} {}X",
            position.symbol,
            position.side,
            format_float(position.leverage)
        )
    }

    pub fn position_opened(&self, user: &UserAddress, position: &Position) -> String {
        format!(
            "{header}❇️ <b>New position opened</b>\n\n\
             <b>Position:</b> {line}\n\n\
             💵 Base currency - USDT\n\
             {RULE}\n\
             🎯 <b>Entry Price:</b> {entry}\n\
             💰 <b>Size:</b> {size}\n\
             {emoji} <b>PnL:</b> {pnl}\n\n\
             Last Update:\n\
             {time}\n\
             VIEW PROFILE ON HYPERDASH ({url})",
            header = Self::header(user),
            line = Self::position_line(position),
            entry = format_float(position.entry_price),
            size = format_float(position.estimated_entry_size),
            emoji = pnl_emoji(position),
            pnl = format_float(position.unrealized_pnl),
            time = self.timestamp(position.observed_at),
            url = self.profile_url(user),
        )
    }

    /// `position` is the last snapshot before the close; `current_price` is
    /// the fresh mark price or the lookup error.
    pub fn position_closed(&self, user: &UserAddress, position: &Position, current_price: &str) -> String {
        format!(
            "{header}⛔️ <b>Position closed</b>\n\n\
             <b>Position:</b> {line}\n\
             💵 <b>Current Price:</b> {price} USDT\n\n\
             Last Update:\n\
             {time}\n\
             VIEW PROFILE ON HYPERDASH ({url})",
            header = Self::header(user),
            line = Self::position_line(position),
            price = escape_html(current_price),
            time = self.timestamp(position.observed_at),
            url = self.profile_url(user),
        )
    }

    /// Current positions of `user`, split into as many messages as needed
    /// to stay within [`MAX_MESSAGE_LEN`]. Every part starts with the
    /// address header; the last one carries the update time and profile
    /// link.
    pub fn snapshot(&self, user: &UserAddress, positions: &[Position]) -> Vec<String> {
        let header = Self::header(user);
        let Some(last) = positions.last() else {
            return vec![format!("{header}💎 <b>No positions found</b>")];
        };

        let prefix = format!("{header}💎 <b>Current positions:</b>\n\n");
        let footer = format!(
            "<b>Last Update:</b>\n{}\n<a href='{}'><b>VIEW PROFILE ON HYPERDASH</b></a>",
            self.timestamp(last.observed_at),
            self.profile_url(user)
        );

        let mut parts = Vec::new();
        let mut current = prefix.clone();
        for position in positions {
            let block = Self::snapshot_block(position);
            if current.len() > prefix.len()
                && message_len(&current) + message_len(&block) > MAX_MESSAGE_LEN
            {
                parts.push(std::mem::replace(&mut current, prefix.clone()));
            }
            current.push_str(&block);
        }
        if current.len() > prefix.len()
            && message_len(&current) + message_len(&footer) > MAX_MESSAGE_LEN
        {
            parts.push(std::mem::replace(&mut current, prefix.clone()));
        }
        current.push_str(&footer);
        parts.push(current);
        parts
    }

    fn snapshot_block(position: &Position) -> String {
        format!(
            "<b>{symbol}</b> {side} {leverage}X\n\
             🎯 <b>Entry:</b> {entry}\n\
             💰 <b>Size:</b> {size}\n\
             {emoji} <b>PnL:</b> {pnl}\n\
             {RULE}\n",
            symbol = position.symbol,
            side = position.side,
            leverage = format_float(position.leverage),
            entry = format_float(position.entry_price),
            size = format_float(position.estimated_entry_size),
            emoji = pnl_emoji(position),
            pnl = format_float(position.unrealized_pnl),
        )
    }

    pub fn address_error(&self, user: &UserAddress, error: &str) -> String {
        format!("Error for address {user}: {}", escape_html(error))
    }

    /// Message sent when the reconciliation loop itself fails.
    pub fn loop_failure(error: &str, retry_after: Duration) -> String {
        format!(
            "Global error occurred:\n{}\n\nRetrying after {}s",
            escape_html(error),
            retry_after.as_secs()
        )
    }

    /// Render any intent to one or more messages, in sending order.
    /// `mark_price` is only used for `PositionClosed`.
    pub fn render(&self, intent: &NotificationIntent, mark_price: Option<&str>) -> Vec<String> {
        match intent {
            NotificationIntent::AddressError { user, message } => {
                vec![self.address_error(user, message)]
            }
            NotificationIntent::PositionOpened { user, position } => {
                vec![self.position_opened(user, position)]
            }
            NotificationIntent::PositionClosed { user, position } => {
                vec![self.position_closed(user, position, mark_price.unwrap_or("unknown"))]
            }
            NotificationIntent::SnapshotReport { user, positions } => self.snapshot(user, positions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const ADDR: &str = "0x5d2f4460ac3514ada79f5d9838916e508ab39bb7";
    const TEMPLATE: &str = "https://hyperdash.info/trader/{address}";

    fn user() -> UserAddress {
        UserAddress::parse(ADDR).unwrap()
    }

    fn renderer() -> MessageRenderer {
        MessageRenderer::new(7, TEMPLATE).unwrap()
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
    }

    fn btc_long() -> Position {
        Position::new("BTC", 0.5, 60000.0, 10.0, at()).with_unrealized_pnl(125.5)
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(10.0), "10.0");
        assert_eq!(format_float(-12.5), "-12.5");
        assert_eq!(format_float(3000.0), "3000.0");
        assert_eq!(format_float(0.1), "0.1");
        assert_eq!(format_float(123.46), "123.46");
        assert_eq!(format_float(0.0), "0.0");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
        assert_eq!(escape_html("64000.5"), "64000.5");
    }

    #[test]
    fn test_timestamp_uses_offset() {
        assert_eq!(renderer().timestamp(at()), "2024-05-01 19:30:00 (UTC+7)");
        let utc = MessageRenderer::new(0, TEMPLATE).unwrap();
        assert_eq!(utc.timestamp(at()), "2024-05-01 12:30:00 (UTC+0)");
        let west = MessageRenderer::new(-5, TEMPLATE).unwrap();
        assert_eq!(west.timestamp(at()), "2024-05-01 07:30:00 (UTC-5)");
    }

    #[test]
    fn test_invalid_offset_rejected() {
        assert!(matches!(
            MessageRenderer::new(30, TEMPLATE),
            Err(NotifyError::Config(_))
        ));
    }

    #[test]
    fn test_position_opened() {
        let message = renderer().position_opened(&user(), &btc_long());
        let expected = format!(
            "⚠️ [<b>0x5d2f4</b>]\n\
             ❇️ <b>New position opened</b>\n\n\
             <b>Position:</b> BTC LONG 10.0X\n\n\
             💵 Base currency - USDT\n\
             ------------------------------\n\
             🎯 <b>Entry Price:</b> 60000.0\n\
             💰 <b>Size:</b> 3000.0\n\
             🟢 <b>PnL:</b> 125.5\n\n\
             Last Update:\n\
             2024-05-01 19:30:00 (UTC+7)\n\
             VIEW PROFILE ON HYPERDASH (https://hyperdash.info/trader/{ADDR})"
        );
        assert_eq!(message, expected);
    }

    #[test]
    fn test_position_closed() {
        let position = Position::new("ETH", -2.0, 3000.0, 5.0, at());
        let message = renderer().position_closed(&user(), &position, "3012.4");
        assert!(message.starts_with("⚠️ [<b>0x5d2f4</b>]\n⛔️ <b>Position closed</b>\n\n"));
        assert!(message.contains("<b>Position:</b> ETH SHORT 5.0X\n"));
        assert!(message.contains("💵 <b>Current Price:</b> 3012.4 USDT\n\n"));
        assert!(message.contains("2024-05-01 19:30:00 (UTC+7)"));
    }

    #[test]
    fn test_position_closed_with_lookup_error() {
        let position = Position::new("ETH", -2.0, 3000.0, 5.0, at());
        let message =
            renderer().position_closed(&user(), &position, "HTTP 502: <html>bad gateway</html>");
        assert!(message.contains("HTTP 502: &lt;html&gt;bad gateway&lt;/html&gt; USDT"));
    }

    #[test]
    fn test_snapshot_empty() {
        assert_eq!(
            renderer().snapshot(&user(), &[]),
            vec!["⚠️ [<b>0x5d2f4</b>]\n💎 <b>No positions found</b>".to_string()]
        );
    }

    #[test]
    fn test_snapshot_lists_positions() {
        let eth = Position::new("ETH", -2.0, 3000.0, 5.0, at()).with_unrealized_pnl(-40.0);
        let message = renderer().snapshot(&user(), &[btc_long(), eth]);

        let expected = format!(
            "⚠️ [<b>0x5d2f4</b>]\n💎 <b>Current positions:</b>\n\n\
             <b>BTC</b> LONG 10.0X\n🎯 <b>Entry:</b> 60000.0\n💰 <b>Size:</b> 3000.0\n🟢 <b>PnL:</b> 125.5\n{RULE}\n\
             <b>ETH</b> SHORT 5.0X\n🎯 <b>Entry:</b> 3000.0\n💰 <b>Size:</b> 1200.0\n🔴 <b>PnL:</b> -40.0\n{RULE}\n\
             <b>Last Update:</b>\n2024-05-01 19:30:00 (UTC+7)\n\
             <a href='https://hyperdash.info/trader/{ADDR}'><b>VIEW PROFILE ON HYPERDASH</b></a>"
        );
        assert_eq!(message, vec![expected]);
    }

    #[test]
    fn test_large_snapshot_is_split_within_limit() {
        let positions: Vec<Position> = (0..40)
            .map(|i| Position::new(format!("COIN{i}"), -1234.5, 61234.5, 20.0, at()))
            .collect();
        let parts = renderer().snapshot(&user(), &positions);

        assert!(parts.len() > 1);
        for part in &parts {
            assert!(message_len(part) <= MAX_MESSAGE_LEN);
            assert!(part.starts_with("⚠️ [<b>0x5d2f4</b>]\n💎 <b>Current positions:</b>\n\n"));
        }
        for (i, part) in parts.iter().enumerate() {
            let is_last = i == parts.len() - 1;
            assert_eq!(part.contains("VIEW PROFILE ON HYPERDASH"), is_last);
        }

        let joined = parts.concat();
        for i in 0..40 {
            assert_eq!(joined.matches(&format!("<b>COIN{i}</b> ")).count(), 1);
        }
        assert!(joined.find("<b>COIN0</b>").unwrap() < joined.find("<b>COIN39</b>").unwrap());
    }

    #[test]
    fn test_address_error_and_loop_failure() {
        assert_eq!(
            renderer().address_error(&user(), "Network error: timed out"),
            format!("Error for address {ADDR}: Network error: timed out")
        );
        assert_eq!(
            MessageRenderer::loop_failure("task panicked", Duration::from_secs(60)),
            "Global error occurred:\ntask panicked\n\nRetrying after 60s"
        );
    }

    #[test]
    fn test_render_dispatches_by_kind() {
        let renderer = renderer();
        let closed = NotificationIntent::PositionClosed {
            user: user(),
            position: btc_long(),
        };
        assert!(renderer
            .render(&closed, Some("61000.0"))[0]
            .contains("Current Price:</b> 61000.0 USDT"));

        let snapshot = NotificationIntent::SnapshotReport {
            user: user(),
            positions: vec![],
        };
        let parts = renderer.render(&snapshot, None);
        assert_eq!(parts.len(), 1);
        assert!(parts[0].ends_with("No positions found</b>"));
    }
}
