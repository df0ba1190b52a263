//! Normalized perp positions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Positions of one address at one poll, keyed by symbol.
///
/// A `BTreeMap` keeps symbols unique and iteration in ascending symbol
/// order, which is the order notifications are emitted in.
pub type PositionSet = BTreeMap<String, Position>;

/// Direction of a position, derived from the sign of its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    /// Classify a signed size.
    ///
    /// Only a strictly positive size is long; zero classifies as short.
    pub fn from_size(size: f64) -> Self {
        if size > 0.0 {
            Self::Long
        } else {
            Self::Short
        }
    }
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "LONG"),
            Self::Short => write!(f, "SHORT"),
        }
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Estimated margin committed at entry: `|size| / leverage * entry_price`.
///
/// Returns 0 when leverage is 0 (unknown) instead of dividing by zero.
pub fn estimated_entry_size(size: f64, leverage: f64, entry_price: f64) -> f64 {
    if leverage == 0.0 {
        return 0.0;
    }
    round2(size.abs() / leverage * entry_price)
}

/// One open exposure for one (address, symbol) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    /// Coin symbol (e.g., "BTC").
    pub symbol: String,
    /// Signed size (positive = long, negative = short).
    pub size: f64,
    /// Average entry price.
    pub entry_price: f64,
    /// Notional value of the position.
    pub position_value: f64,
    /// Unrealized PnL.
    pub unrealized_pnl: f64,
    /// Leverage (0 when unknown).
    pub leverage: f64,
    /// Margin used.
    pub margin_used: f64,
    /// Liquidation price (0 when absent).
    pub liquidation_price: f64,
    /// Max leverage allowed for the market.
    pub max_leverage: f64,
    /// Cumulative funding, passed through as received.
    pub cum_funding: serde_json::Value,
    /// Derived: see [`estimated_entry_size`].
    pub estimated_entry_size: f64,
    /// Derived from the sign of `size`.
    pub side: PositionSide,
    /// When this position was observed.
    pub observed_at: DateTime<Utc>,
}

impl Position {
    /// Create a position and compute its derived fields.
    ///
    /// Fields not given here start at zero / empty and may be filled in by
    /// the caller.
    pub fn new(
        symbol: impl Into<String>,
        size: f64,
        entry_price: f64,
        leverage: f64,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            size,
            entry_price,
            position_value: 0.0,
            unrealized_pnl: 0.0,
            leverage,
            margin_used: 0.0,
            liquidation_price: 0.0,
            max_leverage: 0.0,
            cum_funding: serde_json::Value::Object(Default::default()),
            estimated_entry_size: estimated_entry_size(size, leverage, entry_price),
            side: PositionSide::from_size(size),
            observed_at,
        }
    }

    /// Set unrealized PnL (builder style).
    #[must_use]
    pub fn with_unrealized_pnl(mut self, pnl: f64) -> Self {
        self.unrealized_pnl = pnl;
        self
    }

    /// Whether the position is currently at or above break-even.
    pub fn is_in_profit(&self) -> bool {
        self.unrealized_pnl >= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_from_size() {
        assert_eq!(PositionSide::from_size(5.0), PositionSide::Long);
        assert_eq!(PositionSide::from_size(-3.0), PositionSide::Short);
        assert_eq!(PositionSide::from_size(0.0), PositionSide::Short);
    }

    #[test]
    fn test_side_display() {
        assert_eq!(PositionSide::Long.to_string(), "LONG");
        assert_eq!(PositionSide::Short.to_string(), "SHORT");
    }

    #[test]
    fn test_estimated_entry_size_zero_leverage() {
        assert_eq!(estimated_entry_size(-2.0, 0.0, 100.0), 0.0);
    }

    #[test]
    fn test_estimated_entry_size_rounds() {
        // 0.3 / 3 * 1234.5678 = 123.45678
        assert_eq!(estimated_entry_size(-0.3, 3.0, 1234.5678), 123.46);
        assert_eq!(estimated_entry_size(2.0, 4.0, 10.0), 5.0);
    }

    #[test]
    fn test_new_position_derives_fields() {
        let now = Utc::now();
        let position = Position::new("ETH", -3.0, 2000.0, 10.0, now).with_unrealized_pnl(-12.5);

        assert_eq!(position.symbol, "ETH");
        assert_eq!(position.side, PositionSide::Short);
        assert_eq!(position.estimated_entry_size, 600.0);
        assert_eq!(position.observed_at, now);
        assert!(!position.is_in_profit());
    }

    #[test]
    fn test_position_set_orders_by_symbol() {
        let now = Utc::now();
        let mut set = PositionSet::new();
        for symbol in ["SOL", "BTC", "ETH"] {
            set.insert(symbol.to_string(), Position::new(symbol, 1.0, 1.0, 1.0, now));
        }
        let symbols: Vec<_> = set.keys().cloned().collect();
        assert_eq!(symbols, vec!["BTC", "ETH", "SOL"]);
    }
}
