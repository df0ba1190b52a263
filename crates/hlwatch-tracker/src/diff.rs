//! Symbol-set difference between two snapshots.

use hlwatch_core::PositionSet;

/// Symbols opened and closed between a prior and a new snapshot.
///
/// Both lists are in ascending symbol order. A symbol present in both
/// snapshots appears in neither list, whatever its size did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    /// In `next` but not in `prior`.
    pub opened: Vec<String>,
    /// In `prior` but not in `next`.
    pub closed: Vec<String>,
}

impl SnapshotDiff {
    /// Exact set difference of the two snapshots' symbols.
    pub fn between(prior: &PositionSet, next: &PositionSet) -> Self {
        let opened = next
            .keys()
            .filter(|symbol| !prior.contains_key(*symbol))
            .cloned()
            .collect();
        let closed = prior
            .keys()
            .filter(|symbol| !next.contains_key(*symbol))
            .cloned()
            .collect();
        Self { opened, closed }
    }

    pub fn is_empty(&self) -> bool {
        self.opened.is_empty() && self.closed.is_empty()
    }
}
