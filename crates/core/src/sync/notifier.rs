//! Process-wide sync status broadcast.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use log::warn;

use super::SyncStatus;

/// Callback invoked with the new status on every transition.
pub type StatusListener = Arc<dyn Fn(SyncStatus) + Send + Sync>;

/// Token returned by [`StatusNotifier::subscribe`]; pass it back to
/// [`StatusNotifier::unsubscribe`] to detach the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Observer registry for sync status transitions.
///
/// Every transition is delivered to every live listener synchronously, in
/// subscription order, repeated identical values included, so observers
/// can use deliveries as a liveness signal. A panicking listener is logged
/// and skipped; it never blocks the remaining listeners or corrupts
/// processor state. A listener may subscribe or unsubscribe from within its
/// callback; registry changes take effect on the next transition.
pub struct StatusNotifier {
    status: RwLock<SyncStatus>,
    listeners: Mutex<Vec<(SubscriptionId, StatusListener)>>,
    next_id: AtomicU64,
}

impl Default for StatusNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusNotifier {
    pub fn new() -> Self {
        Self {
            status: RwLock::new(SyncStatus::Idle),
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Current status.
    pub fn status(&self) -> SyncStatus {
        *self.status.read().unwrap_or_else(|err| err.into_inner())
    }

    /// Register a listener; it fires on the next transition, not
    /// retroactively.
    pub fn subscribe(
        &self,
        listener: impl Fn(SyncStatus) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut listeners = self
            .listeners
            .lock()
            .unwrap_or_else(|err| err.into_inner());
        listeners.push((id, Arc::new(listener)));
        id
    }

    /// Detach a listener. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut listeners = self
            .listeners
            .lock()
            .unwrap_or_else(|err| err.into_inner());
        listeners.retain(|(listener_id, _)| *listener_id != id);
    }

    /// Record `status` and fan it out to all listeners.
    pub fn set(&self, status: SyncStatus) {
        {
            let mut current = self.status.write().unwrap_or_else(|err| err.into_inner());
            *current = status;
        }
        // Dispatch from a snapshot, outside the registry lock; callbacks are
        // free to subscribe or unsubscribe.
        let listeners: Vec<(SubscriptionId, StatusListener)> = self
            .listeners
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .clone();
        for (id, listener) in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(status))).is_err() {
                warn!("[Sync] status listener {id:?} panicked on '{status}'");
            }
        }
    }
}
