//! The sync queue processor: drains pending remote mutations serially, in
//! FIFO order, with per-item retry accounting and poison-item eviction.

use std::sync::Arc;

use chrono::Utc;
use log::{debug, info, warn};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::connectivity::ConnectivityOracle;
use crate::errors::RemoteStoreError;
use crate::store::LocalStore;
use crate::utils::relative_time::format_relative;

use super::{
    QueuePayload, RemoteWorkoutStore, StatusNotifier, SyncAction, SyncInfo, SyncPolicy,
    SyncQueueItem, SyncReport, SyncStatus,
};

pub struct SyncProcessor {
    store: Arc<LocalStore>,
    remote: Arc<dyn RemoteWorkoutStore>,
    oracle: Arc<dyn ConnectivityOracle>,
    notifier: Arc<StatusNotifier>,
    policy: SyncPolicy,
    /// Guards the single-drain invariant; a second caller takes the no-op
    /// path instead of waiting.
    drain_lock: Mutex<()>,
    listener_task: Mutex<Option<JoinHandle<()>>>,
}

impl SyncProcessor {
    pub fn new(
        store: Arc<LocalStore>,
        remote: Arc<dyn RemoteWorkoutStore>,
        oracle: Arc<dyn ConnectivityOracle>,
        notifier: Arc<StatusNotifier>,
        policy: SyncPolicy,
    ) -> Self {
        Self {
            store,
            remote,
            oracle,
            notifier,
            policy,
            drain_lock: Mutex::new(()),
            listener_task: Mutex::new(None),
        }
    }

    pub fn notifier(&self) -> &Arc<StatusNotifier> {
        &self.notifier
    }

    /// Drain the queue once.
    ///
    /// A concurrent call while a drain is in flight is a no-op reporting the
    /// current backlog. When unreachable, the status flips to offline and
    /// the backlog is reported without touching the adapter. A single
    /// item's failure never aborts the pass.
    pub async fn process_queue(&self) -> SyncReport {
        let _guard = match self.drain_lock.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                debug!("[Sync] drain already in flight, skipping");
                return SyncReport::pending_only(self.store.pending_count().await);
            }
        };

        if !self.oracle.is_connected() {
            debug!("[Sync] unreachable, deferring drain");
            self.notifier.set(SyncStatus::Offline);
            return SyncReport::pending_only(self.store.pending_count().await);
        }

        self.notifier.set(SyncStatus::Syncing);

        let mut queue = self.store.sync_queue().await;
        queue.sort_by_key(|item| item.enqueued_at);
        debug!("[Sync] draining {} pending operation(s)", queue.len());

        let mut success = 0usize;
        let mut failed = 0usize;
        for item in queue {
            match self.apply_item(&item).await {
                Ok(()) => match self.store.dequeue(&item.id).await {
                    Ok(()) => {
                        success += 1;
                        debug!("[Sync] applied {} ({} {})", item.id, item.action, item.category);
                    }
                    Err(err) => {
                        warn!("[Sync] applied {} but could not dequeue it: {err}", item.id);
                        if let Err(store_err) = self.store.increment_retry(&item.id).await {
                            warn!("[Sync] could not record retry for {}: {store_err}", item.id);
                        }
                        failed += 1;
                    }
                },
                Err(err) => {
                    warn!(
                        "[Sync] item {} failed ({} {}): {err}",
                        item.id, item.action, item.category
                    );
                    if let Err(store_err) = self.store.increment_retry(&item.id).await {
                        warn!("[Sync] could not record retry for {}: {store_err}", item.id);
                    }
                    failed += 1;
                }
            }
        }

        match self.store.evict_exhausted(self.policy.retry_ceiling).await {
            Ok(0) => {}
            Ok(evicted) => info!("[Sync] dropped {evicted} permanently failing operation(s)"),
            Err(err) => warn!("[Sync] eviction pass failed: {err}"),
        }

        if success > 0 {
            if let Err(err) = self.store.mark_synced_now().await {
                warn!("[Sync] could not record last-sync time: {err}");
            }
        }

        self.notifier.set(if failed > 0 {
            SyncStatus::Error
        } else {
            SyncStatus::Idle
        });

        let pending = self.store.pending_count().await;
        info!("[Sync] drain finished: {success} applied, {failed} failed, {pending} pending");
        SyncReport {
            success,
            failed,
            pending,
        }
    }

    /// User-triggered retry. Same semantics as [`Self::process_queue`],
    /// kept as a separate call site for telemetry.
    pub async fn force_sync(&self) -> SyncReport {
        info!("[Sync] manual sync requested");
        self.process_queue().await
    }

    async fn apply_item(&self, item: &SyncQueueItem) -> Result<(), RemoteStoreError> {
        match (&item.action, &item.payload) {
            // An update re-sends the full record; the remote create is an
            // upsert for already-known payloads.
            (SyncAction::Create | SyncAction::Update, QueuePayload::Record(draft)) => {
                let id = self.remote.create(draft).await?;
                let record = draft.clone().into_workout(id);
                if let Err(err) = self.remote.update_aggregate(&record).await {
                    // Aggregates converge eventually; a miss here is not
                    // worth re-creating the record over.
                    warn!("[Sync] aggregate update failed for {}: {err}", record.id);
                }
                Ok(())
            }
            (SyncAction::Delete, QueuePayload::Delete { id }) => {
                self.remote.delete(item.category, id).await
            }
            (action, _) => Err(RemoteStoreError::payload(format!(
                "queue item {} pairs action '{action}' with a mismatched payload",
                item.id
            ))),
        }
    }

    /// Snapshot for a status badge: current status, backlog size, last
    /// successful sync, reachability.
    pub async fn sync_info(&self) -> SyncInfo {
        let last_sync = match self.store.last_sync().await {
            Some(at) => format_relative(at, Utc::now()),
            None => "never synced".to_string(),
        };
        SyncInfo {
            status: self.notifier.status(),
            pending_count: self.store.pending_count().await,
            last_sync,
            is_online: self.oracle.is_connected(),
        }
    }

    pub async fn pending_count(&self) -> usize {
        self.store.pending_count().await
    }

    /// Start reacting to reachability transitions: every switch to
    /// reachable triggers an immediate drain; a loss of reachability flips
    /// the status to offline. Idempotent while the listener is alive.
    pub async fn start_network_listener(self: Arc<Self>) {
        let mut guard = self.listener_task.lock().await;
        if let Some(handle) = guard.as_ref() {
            if !handle.is_finished() {
                return;
            }
            guard.take();
        }

        let processor = Arc::clone(&self);
        let mut rx = self.oracle.watch();
        let handle = tokio::spawn(async move {
            loop {
                if rx.changed().await.is_err() {
                    debug!("[Sync] connectivity oracle dropped, stopping listener");
                    break;
                }
                let connected = *rx.borrow_and_update();
                if connected {
                    debug!("[Sync] reachable again, draining queue");
                    processor.notifier.set(SyncStatus::Idle);
                    processor.process_queue().await;
                } else {
                    debug!("[Sync] connectivity lost");
                    processor.notifier.set(SyncStatus::Offline);
                }
            }
        });
        *guard = Some(handle);
    }

    pub async fn stop_network_listener(&self) {
        let mut guard = self.listener_task.lock().await;
        if let Some(handle) = guard.take() {
            handle.abort();
        }
    }
}
