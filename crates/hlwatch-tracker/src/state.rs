//! Per-address reconciliation state.

use hlwatch_core::PositionSet;

/// Where an address is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressPhase {
    /// Never seen by a cycle.
    Uninitialized,
    /// Seen, but no successful poll yet.
    FirstRun,
    /// At least one successful poll; diffs are reported.
    SteadyState,
}

/// Last known positions of one address.
#[derive(Debug, Clone)]
pub(crate) struct AddressState {
    pub(crate) last_known: PositionSet,
    pub(crate) is_first_run: bool,
}

impl AddressState {
    pub(crate) fn new() -> Self {
        Self {
            last_known: PositionSet::new(),
            is_first_run: true,
        }
    }

    pub(crate) fn phase(&self) -> AddressPhase {
        if self.is_first_run {
            AddressPhase::FirstRun
        } else {
            AddressPhase::SteadyState
        }
    }

    /// Replace the snapshot after a successful poll.
    pub(crate) fn commit(&mut self, positions: PositionSet) {
        self.last_known = positions;
        self.is_first_run = false;
    }
}
