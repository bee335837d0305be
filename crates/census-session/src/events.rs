//! Notifications published by the explorer.

use census_model::{DatasetHandle, Level};

/// Broadcast to every subscriber of [`Explorer::subscribe`].
///
/// Sent best-effort: with no subscribers events are dropped.
///
/// [`Explorer::subscribe`]: crate::Explorer::subscribe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplorerEvent {
    /// A drill-down or back navigation began.
    TransitionStarted { from: Level, to: Level },
    /// The navigation finished; `level` is where the explorer ended up.
    TransitionFinished { level: Level, breadcrumb: String },
    DatasetSelected { handle: DatasetHandle },
    /// Selecting `handle` failed; the previous selection was kept.
    DatasetSelectionFailed { handle: DatasetHandle, reason: String },
    DatasetCleared,
    /// Every set dimension was re-enumerated and ranges cleared.
    FiltersReset { level: Level },
}
