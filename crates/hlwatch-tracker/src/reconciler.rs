//! Reconciliation engine.
//!
//! Owns the [`AddressState`] of every tracked address. Per address and
//! cycle:
//!
//! ```text
//! fetch ──Err──▶ AddressError            (state untouched)
//!   │
//!   Ok(N)
//!   ├─ first run ─▶ SnapshotReport(N)
//!   └─ otherwise ─▶ Opened(N \ P), Closed(P \ N)
//!   then P := N, first run := false
//! ```
//!
//! Fetches for one cycle run concurrently, but their results are applied
//! one address at a time in registry order, so every diff is computed
//! against that address's own prior snapshot and the intent order is
//! deterministic.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use hlwatch_core::{PositionSet, UserAddress};
use hlwatch_info::{normalize_positions, AccountSource, InfoError, InfoResult};

use crate::diff::SnapshotDiff;
use crate::intent::NotificationIntent;
use crate::state::{AddressPhase, AddressState};

/// Default number of account fetches in flight per cycle.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;

/// Outcome of one reconciliation cycle.
#[derive(Debug, Default)]
pub struct CycleReport {
    /// Intents in emission order.
    pub intents: Vec<NotificationIntent>,
    /// Addresses fetched successfully.
    pub succeeded: usize,
    /// Addresses whose fetch failed, with the error kind.
    pub failures: Vec<(UserAddress, &'static str)>,
    /// Wall time of the cycle.
    pub elapsed: Duration,
}

/// Per-address first-run / steady-state tracker.
#[derive(Debug)]
pub struct Reconciler {
    states: HashMap<UserAddress, AddressState>,
    fetch_concurrency: usize,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_CONCURRENCY)
    }
}

impl Reconciler {
    /// Create an empty reconciler; `fetch_concurrency` is clamped to at least 1.
    pub fn new(fetch_concurrency: usize) -> Self {
        Self {
            states: HashMap::new(),
            fetch_concurrency: fetch_concurrency.max(1),
        }
    }

    /// Lifecycle phase of `user`.
    pub fn phase(&self, user: &UserAddress) -> AddressPhase {
        self.states
            .get(user)
            .map_or(AddressPhase::Uninitialized, AddressState::phase)
    }

    /// Last successfully fetched positions of `user`.
    pub fn last_known(&self, user: &UserAddress) -> Option<&PositionSet> {
        self.states.get(user).map(|state| &state.last_known)
    }

    /// Number of addresses with state.
    pub fn tracked_count(&self) -> usize {
        self.states.len()
    }

    /// Drop state for addresses not in `keep`. Returns how many were dropped.
    ///
    /// An address that is removed and later re-added starts over with a
    /// snapshot report.
    pub fn prune(&mut self, keep: &[UserAddress]) -> usize {
        let keep: HashSet<&UserAddress> = keep.iter().collect();
        let before = self.states.len();
        self.states.retain(|user, _| keep.contains(user));
        let dropped = before - self.states.len();
        if dropped > 0 {
            debug!(dropped, "Pruned state of untracked addresses");
        }
        dropped
    }

    /// Apply one fetch result for `user` and return the intents it produces.
    pub fn observe(
        &mut self,
        user: &UserAddress,
        fetched: InfoResult<PositionSet>,
    ) -> Vec<NotificationIntent> {
        let state = self
            .states
            .entry(user.clone())
            .or_insert_with(AddressState::new);

        let next = match fetched {
            Ok(next) => next,
            Err(e) => {
                warn!(user = %user, error = %e, "Failed to fetch positions");
                return vec![NotificationIntent::AddressError {
                    user: user.clone(),
                    message: e.to_string(),
                }];
            }
        };

        let intents = if state.is_first_run {
            info!(
                user = %user,
                positions = next.len(),
                "First snapshot for address"
            );
            vec![NotificationIntent::SnapshotReport {
                user: user.clone(),
                positions: next.values().cloned().collect(),
            }]
        } else {
            let diff = SnapshotDiff::between(&state.last_known, &next);
            let mut intents = Vec::with_capacity(diff.opened.len() + diff.closed.len());
            for symbol in &diff.opened {
                if let Some(position) = next.get(symbol) {
                    info!(user = %user, symbol = %symbol, side = %position.side, "Position opened");
                    intents.push(NotificationIntent::PositionOpened {
                        user: user.clone(),
                        position: position.clone(),
                    });
                }
            }
            for symbol in &diff.closed {
                if let Some(position) = state.last_known.get(symbol) {
                    info!(user = %user, symbol = %symbol, side = %position.side, "Position closed");
                    intents.push(NotificationIntent::PositionClosed {
                        user: user.clone(),
                        position: position.clone(),
                    });
                }
            }
            intents
        };

        state.commit(next);
        intents
    }

    /// Run one cycle over `users` (in registry order).
    ///
    /// State of addresses no longer in `users` is pruned first. A failing
    /// address never stops the others.
    pub async fn run_cycle<S: AccountSource>(
        &mut self,
        source: &S,
        users: &[UserAddress],
    ) -> CycleReport {
        let started = Instant::now();
        self.prune(users);
        for user in users {
            self.states
                .entry(user.clone())
                .or_insert_with(AddressState::new);
        }

        let results: Vec<(UserAddress, InfoResult<PositionSet>)> = stream::iter(users.iter().cloned())
            .map(|user| async move {
                let result = fetch_positions(source, &user).await;
                (user, result)
            })
            .buffered(self.fetch_concurrency)
            .collect()
            .await;

        let mut report = CycleReport::default();
        for (user, result) in results {
            match &result {
                Ok(_) => report.succeeded += 1,
                Err(e) => report.failures.push((user.clone(), e.kind())),
            }
            let intents = self.observe(&user, result);
            report.intents.extend(intents);
        }
        report.elapsed = started.elapsed();

        debug!(
            addresses = users.len(),
            succeeded = report.succeeded,
            failed = report.failures.len(),
            intents = report.intents.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Reconciliation cycle complete"
        );
        report
    }
}

async fn fetch_positions<S: AccountSource>(
    source: &S,
    user: &UserAddress,
) -> Result<PositionSet, InfoError> {
    let snapshot = source.fetch_account_snapshot(user).await?;
    let summary = snapshot.summary();
    debug!(
        user = %user,
        account_value = summary.account_value.value(),
        total_notional = summary.total_notional_position.value(),
        margin_used = summary.total_margin_used.value(),
        withdrawable = snapshot.withdrawable.value(),
        "Margin summary"
    );
    Ok(normalize_positions(&snapshot, Utc::now()))
}
