//! Request dispatcher.
//!
//! Serialized mode keeps at most one executor in flight; waiting requests
//! form a FIFO queue and leave it the instant their executor launches.
//! Parallel mode launches every submission immediately.

use tokio::sync::{Mutex, MutexGuard};

/// Dispatch strategy, fixed at client construction.
///
/// Serialization avoids concurrent refresh triggers from simultaneous 401s
/// and lost-update races on the same storage key; parallel mode trades
/// those guarantees for throughput.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DispatchMode {
    /// One request in flight at a time, FIFO launch order (default)
    #[default]
    Serialized,
    /// Every request launches immediately, no ordering guarantee
    Parallel,
}

/// Gates executor launches according to the configured mode.
///
/// The serialized lane is a fair async mutex: waiters are queued FIFO and
/// the guard is held until the executor reaches a terminal state, so a
/// later submission never starts its transport call before an earlier one
/// finishes.
pub struct RequestDispatcher {
    mode: DispatchMode,
    lane: Mutex<()>,
}

impl RequestDispatcher {
    /// Creates a dispatcher for the given mode.
    pub fn new(mode: DispatchMode) -> Self {
        Self {
            mode,
            lane: Mutex::new(()),
        }
    }

    /// The configured mode.
    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// Waits for a launch slot.
    ///
    /// Returns a guard to hold for the request's lifetime in serialized
    /// mode, `None` in parallel mode.
    pub async fn acquire(&self) -> Option<MutexGuard<'_, ()>> {
        match self.mode {
            DispatchMode::Serialized => Some(self.lane.lock().await),
            DispatchMode::Parallel => None,
        }
    }
}
