//! Notification intents produced by the reconciler.

use hlwatch_core::{Position, UserAddress};

/// A pending notification, rendered and sent by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationIntent {
    /// Fetching the account failed this cycle.
    AddressError { user: UserAddress, message: String },
    /// A symbol appeared since the last poll (data from the new poll).
    PositionOpened { user: UserAddress, position: Position },
    /// A symbol disappeared since the last poll (data from the previous poll).
    PositionClosed { user: UserAddress, position: Position },
    /// First successful poll of an address: every position it holds.
    SnapshotReport {
        user: UserAddress,
        positions: Vec<Position>,
    },
}

impl NotificationIntent {
    /// Address the intent is about.
    pub fn user(&self) -> &UserAddress {
        match self {
            Self::AddressError { user, .. }
            | Self::PositionOpened { user, .. }
            | Self::PositionClosed { user, .. }
            | Self::SnapshotReport { user, .. } => user,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddressError { .. } => "address_error",
            Self::PositionOpened { .. } => "opened",
            Self::PositionClosed { .. } => "closed",
            Self::SnapshotReport { .. } => "snapshot",
        }
    }
}
