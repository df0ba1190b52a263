//! HTTP client for the Hyperliquid info endpoint.
//!
//! Two requests are used:
//! - `clearinghouseState` for an account's margin summary and open positions
//! - `metaAndAssetCtxs` for mark prices
//!
//! There is no caching and no retry here; every error is returned to the
//! caller, which decides how a failing address is reported.

use crate::error::{InfoError, InfoResult};
use crate::headers::{default_headers, with_overrides};
use crate::types::AccountSnapshot;
use hlwatch_core::UserAddress;
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Default info endpoint.
pub const DEFAULT_INFO_URL: &str = "https://api.hyperliquid.xyz/info";

/// Default timeout for API requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Body of a POST /info request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoRequest {
    #[serde(rename = "type")]
    pub request_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl InfoRequest {
    /// `{"type": "clearinghouseState", "user": "<address>"}`
    pub fn clearinghouse_state(user: &UserAddress) -> Self {
        Self {
            request_type: "clearinghouseState".to_string(),
            user: Some(user.to_string()),
        }
    }

    /// `{"type": "metaAndAssetCtxs"}`
    pub fn meta_and_asset_ctxs() -> Self {
        Self {
            request_type: "metaAndAssetCtxs".to_string(),
            user: None,
        }
    }
}

/// Find the mark price of `symbol` in a `metaAndAssetCtxs` response.
///
/// The response is `[meta, [ctx, ...]]`; each ctx carries `name` and
/// `markPx`. The price is returned as the string the API sent, without
/// parsing.
pub fn find_mark_price(body: &Value, symbol: &str) -> InfoResult<String> {
    let ctxs = body
        .get(1)
        .and_then(Value::as_array)
        .ok_or_else(|| InfoError::Decode("metaAndAssetCtxs: missing asset context list".into()))?;

    ctxs.iter()
        .filter(|ctx| ctx.get("name").and_then(Value::as_str) == Some(symbol))
        .find_map(|ctx| match ctx.get("markPx")? {
            Value::String(px) => Some(px.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        })
        .ok_or_else(|| InfoError::NotFound(format!("Symbol {symbol} not found")))
}

/// Client for the info endpoint.
#[derive(Clone)]
pub struct InfoClient {
    /// HTTP client.
    client: Client,
    /// Info endpoint URL.
    info_url: String,
}

impl InfoClient {
    /// Create a new client with the default headers and timeout.
    ///
    /// # Arguments
    /// * `info_url` - URL of the info endpoint (e.g., "https://api.hyperliquid.xyz/info")
    pub fn new(info_url: impl Into<String>) -> InfoResult<Self> {
        Self::with_options(info_url, default_headers(), DEFAULT_TIMEOUT)
    }

    /// Create a client whose default headers are extended or replaced by
    /// `overrides`.
    pub fn with_header_overrides(
        info_url: impl Into<String>,
        overrides: &[(&str, &str)],
    ) -> InfoResult<Self> {
        Self::with_options(info_url, with_overrides(overrides)?, DEFAULT_TIMEOUT)
    }

    /// Create a client with explicit headers and request timeout.
    pub fn with_options(
        info_url: impl Into<String>,
        headers: HeaderMap,
        timeout: Duration,
    ) -> InfoResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| InfoError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            info_url: info_url.into(),
        })
    }

    /// POST a request and decode the JSON body.
    ///
    /// Transport failures map to `Network`, non-2xx to `Http`, and a body
    /// that does not decode as `T` to `Decode`.
    async fn post<T: DeserializeOwned>(&self, request: &InfoRequest) -> InfoResult<T> {
        let response = self
            .client
            .post(&self.info_url)
            .json(request)
            .send()
            .await
            .map_err(|e| InfoError::Network(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InfoError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| InfoError::Network(format!("Failed to read response body: {e}")))?;

        serde_json::from_slice(&body).map_err(|e| {
            InfoError::Decode(format!("Failed to parse {}: {e}", request.request_type))
        })
    }

    /// Fetch clearinghouse state for a user.
    ///
    /// An address with no open positions yields a snapshot with an empty
    /// position list, not an error.
    pub async fn fetch_account_snapshot(&self, user: &UserAddress) -> InfoResult<AccountSnapshot> {
        debug!(user = %user, "Fetching clearinghouseState");

        let state: AccountSnapshot = self.post(&InfoRequest::clearinghouse_state(user)).await?;

        debug!(
            user = %user,
            positions = state.positions().len(),
            "Fetched clearinghouseState"
        );
        Ok(state)
    }

    /// Fetch the current mark price of `symbol` as an opaque string.
    pub async fn fetch_mark_price(&self, symbol: &str) -> InfoResult<String> {
        debug!(symbol, "Fetching mark price");

        let body: Value = self.post(&InfoRequest::meta_and_asset_ctxs()).await?;
        let mark_px = find_mark_price(&body, symbol)?;

        debug!(symbol, mark_px = %mark_px, "Fetched mark price");
        Ok(mark_px)
    }
}
