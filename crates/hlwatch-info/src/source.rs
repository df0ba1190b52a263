//! Data source traits.
//!
//! The reconciliation loop and the notification dispatcher depend on these
//! traits rather than on [`InfoClient`] directly, so tests can substitute
//! in-memory sources.

use crate::client::InfoClient;
use crate::error::InfoResult;
use crate::types::AccountSnapshot;
use hlwatch_core::UserAddress;
use std::future::Future;

/// Source of account snapshots.
pub trait AccountSource: Send + Sync {
    fn fetch_account_snapshot(
        &self,
        user: &UserAddress,
    ) -> impl Future<Output = InfoResult<AccountSnapshot>> + Send;
}

/// Source of mark prices.
pub trait MarkPriceSource: Send + Sync {
    fn fetch_mark_price(&self, symbol: &str) -> impl Future<Output = InfoResult<String>> + Send;
}

impl AccountSource for InfoClient {
    async fn fetch_account_snapshot(&self, user: &UserAddress) -> InfoResult<AccountSnapshot> {
        InfoClient::fetch_account_snapshot(self, user).await
    }
}

impl MarkPriceSource for InfoClient {
    async fn fetch_mark_price(&self, symbol: &str) -> InfoResult<String> {
        InfoClient::fetch_mark_price(self, symbol).await
    }
}
