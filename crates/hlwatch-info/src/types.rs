//! Raw info API response types.
//!
//! These mirror the wire format of `clearinghouseState`. Numeric fields use
//! the lenient decoders from [`crate::lenient`], so a payload with odd or
//! missing numbers still decodes; only structurally broken payloads (a body
//! that is not JSON, or an object where a list is required) fail.

use crate::lenient::{LenientF64, LenientLeverage};
use serde::Deserialize;
use serde_json::Value;

/// Account snapshot as returned by the info API.
pub type AccountSnapshot = ClearinghouseState;

/// `clearinghouseState` response.
///
/// Endpoint: POST /info with `{"type": "clearinghouseState", "user": "<address>"}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClearinghouseState {
    /// Margin summary.
    #[serde(rename = "marginSummary", default)]
    pub margin_summary: Option<MarginSummary>,
    /// Withdrawable balance.
    #[serde(default)]
    pub withdrawable: LenientF64,
    /// Open positions. `null` is treated like an empty list.
    #[serde(rename = "assetPositions", default)]
    pub asset_positions: Option<Vec<AssetPositionEntry>>,
    /// Server timestamp in milliseconds.
    #[serde(default)]
    pub time: Option<u64>,
}

impl ClearinghouseState {
    /// Open position entries (empty when the account has none).
    pub fn positions(&self) -> &[AssetPositionEntry] {
        self.asset_positions.as_deref().unwrap_or(&[])
    }

    /// Margin summary, zeroed when absent.
    pub fn summary(&self) -> MarginSummary {
        self.margin_summary.unwrap_or_default()
    }
}

/// Margin summary of an account.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct MarginSummary {
    /// Account value in USD.
    #[serde(rename = "accountValue", default)]
    pub account_value: LenientF64,
    /// Total notional position value.
    #[serde(rename = "totalNtlPos", default)]
    pub total_notional_position: LenientF64,
    /// Total raw USD.
    #[serde(rename = "totalRawUsd", default)]
    pub total_raw_usd: LenientF64,
    /// Total margin used.
    #[serde(rename = "totalMarginUsed", default)]
    pub total_margin_used: LenientF64,
}

/// Asset position entry from clearinghouseState.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetPositionEntry {
    /// Position details.
    #[serde(default)]
    pub position: RawPosition,
    /// Position type ("oneWay").
    #[serde(rename = "type", default)]
    pub position_type: Option<String>,
}

/// Position data within [`AssetPositionEntry`].
#[derive(Debug, Clone, Deserialize)]
pub struct RawPosition {
    /// Coin symbol (e.g., "BTC").
    #[serde(default)]
    pub coin: Option<String>,
    /// Signed size.
    #[serde(default)]
    pub szi: LenientF64,
    #[serde(rename = "entryPx", default)]
    pub entry_px: LenientF64,
    #[serde(rename = "positionValue", default)]
    pub position_value: LenientF64,
    #[serde(rename = "unrealizedPnl", default)]
    pub unrealized_pnl: LenientF64,
    #[serde(default)]
    pub leverage: LenientLeverage,
    #[serde(rename = "marginUsed", default)]
    pub margin_used: LenientF64,
    #[serde(rename = "liquidationPx", default)]
    pub liquidation_px: LenientF64,
    #[serde(rename = "maxLeverage", default)]
    pub max_leverage: LenientF64,
    /// Cumulative funding, kept as received (`{}` when missing).
    #[serde(rename = "cumFunding", default = "empty_object")]
    pub cum_funding: Value,
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

impl Default for RawPosition {
    fn default() -> Self {
        Self {
            coin: None,
            szi: LenientF64::default(),
            entry_px: LenientF64::default(),
            position_value: LenientF64::default(),
            unrealized_pnl: LenientF64::default(),
            leverage: LenientLeverage::default(),
            margin_used: LenientF64::default(),
            liquidation_px: LenientF64::default(),
            max_leverage: LenientF64::default(),
            cum_funding: empty_object(),
        }
    }
}
