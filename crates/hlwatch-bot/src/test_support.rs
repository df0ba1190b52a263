//! In-memory fakes for the loop tests.

use hlwatch_info::{AccountSnapshot, AccountSource, InfoError, InfoResult, MarkPriceSource};
use hlwatch_core::UserAddress;
use hlwatch_notify::{ChatTransport, NotifyError, NotifyResult, Update};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::{HashMap, VecDeque};

pub const A: &str = "0x1111111111111111111111111111111111111111";
pub const B: &str = "0x2222222222222222222222222222222222222222";

/// Account snapshot holding one long position per coin.
pub fn snapshot(coins: &[&str]) -> AccountSnapshot {
    let positions: Vec<_> = coins
        .iter()
        .map(|coin| {
            json!({"type": "oneWay", "position": {
                "coin": coin,
                "szi": "1.5",
                "entryPx": "100.0",
                "unrealizedPnl": "3.25",
                "leverage": {"type": "cross", "value": 5}
            }})
        })
        .collect();
    serde_json::from_value(json!({
        "marginSummary": {"accountValue": "1000.0"},
        "withdrawable": "250.0",
        "assetPositions": positions
    }))
    .unwrap()
}

pub fn update(update_id: i64, chat_id: i64, text: &str) -> Update {
    serde_json::from_value(json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id,
            "from": {"id": chat_id, "is_bot": false},
            "chat": {"id": chat_id, "type": "private"},
            "text": text
        }
    }))
    .unwrap()
}

/// Account source answering from per-address scripts.
///
/// Each fetch pops the next scripted result; an exhausted script keeps
/// returning its last entry, and an unscripted address has no positions.
#[derive(Default)]
pub struct ScriptedSource {
    scripts: Mutex<HashMap<String, VecDeque<InfoResult<AccountSnapshot>>>>,
}

impl ScriptedSource {
    pub fn push(&self, user: &str, result: InfoResult<AccountSnapshot>) {
        self.scripts
            .lock()
            .entry(user.to_string())
            .or_default()
            .push_back(result);
    }
}

impl AccountSource for ScriptedSource {
    async fn fetch_account_snapshot(&self, user: &UserAddress) -> InfoResult<AccountSnapshot> {
        let mut scripts = self.scripts.lock();
        let Some(script) = scripts.get_mut(user.as_str()) else {
            return Ok(AccountSnapshot::default());
        };
        if script.len() > 1 {
            script.pop_front().unwrap_or_else(|| Ok(AccountSnapshot::default()))
        } else {
            script
                .front()
                .cloned()
                .unwrap_or_else(|| Ok(AccountSnapshot::default()))
        }
    }
}

#[derive(Default)]
pub struct FixedPrices(pub HashMap<String, String>);

impl MarkPriceSource for FixedPrices {
    async fn fetch_mark_price(&self, symbol: &str) -> InfoResult<String> {
        self.0
            .get(symbol)
            .cloned()
            .ok_or_else(|| InfoError::NotFound(format!("Symbol {symbol} not found")))
    }
}

/// Chat transport recording sends and replaying scripted update batches.
#[derive(Default)]
pub struct FakeChat {
    pub sent: Mutex<Vec<(i64, String)>>,
    pub offsets: Mutex<Vec<Option<i64>>>,
    batches: Mutex<VecDeque<NotifyResult<Vec<Update>>>>,
}

impl FakeChat {
    pub fn push_batch(&self, batch: NotifyResult<Vec<Update>>) {
        self.batches.lock().push_back(batch);
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent.lock().iter().map(|(_, text)| text.clone()).collect()
    }

    pub fn sent_to(&self, chat_id: i64) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter(|(chat, _)| *chat == chat_id)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

impl ChatTransport for FakeChat {
    async fn send_message(&self, chat_id: i64, text: &str) -> NotifyResult<()> {
        self.sent.lock().push((chat_id, text.to_string()));
        Ok(())
    }

    async fn get_updates(&self, offset: Option<i64>) -> NotifyResult<Vec<Update>> {
        self.offsets.lock().push(offset);
        self.batches
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

pub fn network_error() -> NotifyError {
    NotifyError::Network("connection reset".into())
}
