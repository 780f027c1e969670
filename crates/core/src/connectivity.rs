//! Reachability reporting and change notifications.

use tokio::sync::watch;

/// Point-in-time reachability plus a subscription channel for transitions.
///
/// Implementations must fail closed: when the underlying platform check
/// errors, report unreachable rather than invite doomed remote calls.
pub trait ConnectivityOracle: Send + Sync {
    /// Current reachability judgment.
    fn is_connected(&self) -> bool;

    /// Receiver yielding the new reachability value on every transition.
    fn watch(&self) -> watch::Receiver<bool>;
}

/// Oracle driven by the host (device network callbacks, tests).
#[derive(Debug)]
pub struct ConnectivityHandle {
    tx: watch::Sender<bool>,
}

impl ConnectivityHandle {
    pub fn new(initially_connected: bool) -> Self {
        let (tx, _rx) = watch::channel(initially_connected);
        Self { tx }
    }

    /// Push a reachability transition to all watchers.
    pub fn set_connected(&self, connected: bool) {
        self.tx.send_replace(connected);
    }
}

impl ConnectivityOracle for ConnectivityHandle {
    fn is_connected(&self) -> bool {
        *self.tx.borrow()
    }

    fn watch(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn transitions_reach_watchers() {
        let handle = ConnectivityHandle::new(false);
        let mut rx = handle.watch();
        assert!(!handle.is_connected());

        handle.set_connected(true);
        rx.changed().await.expect("sender alive");
        assert!(*rx.borrow_and_update());
        assert!(handle.is_connected());

        handle.set_connected(false);
        rx.changed().await.expect("sender alive");
        assert!(!*rx.borrow_and_update());
    }
}
