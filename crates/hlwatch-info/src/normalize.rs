//! Raw position payload → [`Position`].

use crate::types::{ClearinghouseState, RawPosition};
use chrono::{DateTime, Utc};
use hlwatch_core::{Position, PositionSet};
use tracing::warn;

/// Convert one raw position into a [`Position`].
///
/// Never fails: numeric fields were already coerced by the lenient decoders,
/// and the derived fields guard against zero leverage.
pub fn normalize(raw: &RawPosition, observed_at: DateTime<Utc>) -> Position {
    let symbol = raw.coin.clone().unwrap_or_default();
    let mut position = Position::new(
        symbol,
        raw.szi.value(),
        raw.entry_px.value(),
        raw.leverage.value(),
        observed_at,
    );
    position.position_value = raw.position_value.value();
    position.unrealized_pnl = raw.unrealized_pnl.value();
    position.margin_used = raw.margin_used.value();
    position.liquidation_price = raw.liquidation_px.value();
    position.max_leverage = raw.max_leverage.value();
    position.cum_funding = raw.cum_funding.clone();
    position
}

/// Normalize every position of an account snapshot into a [`PositionSet`].
///
/// Entries without a coin are dropped. If the same coin appears twice the
/// later entry wins, keeping symbols unique within the set.
pub fn normalize_positions(state: &ClearinghouseState, observed_at: DateTime<Utc>) -> PositionSet {
    let mut set = PositionSet::new();
    for entry in state.positions() {
        let position = normalize(&entry.position, observed_at);
        if position.symbol.is_empty() {
            warn!("Dropping position entry without coin");
            continue;
        }
        if let Some(previous) = set.insert(position.symbol.clone(), position) {
            warn!(symbol = %previous.symbol, "Duplicate coin in assetPositions, keeping last");
        }
    }
    set
}
