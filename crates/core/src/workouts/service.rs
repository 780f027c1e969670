//! Offline-first write and read paths.
//!
//! Every write commits to the local store before anything touches the
//! network; remote reconciliation happens through the sync queue. Reads
//! merge remote-confirmed records with the local cache so records authored
//! offline stay visible.

use std::sync::Arc;

use log::{debug, warn};

use crate::connectivity::ConnectivityOracle;
use crate::errors::Result;
use crate::store::LocalStore;
use crate::sync::{
    QueueWriteRequest, RemoteWorkoutStore, SyncInfo, SyncPolicy, SyncProcessor, SyncReport,
};

use super::{
    merge_remote_local, superseded_by_remote, temp_workout_id, Category, Workout, WorkoutDraft,
    WorkoutFilter, WorkoutStats,
};

pub struct OfflineWorkoutService {
    store: Arc<LocalStore>,
    remote: Arc<dyn RemoteWorkoutStore>,
    oracle: Arc<dyn ConnectivityOracle>,
    processor: Arc<SyncProcessor>,
    policy: SyncPolicy,
}

impl OfflineWorkoutService {
    pub fn new(
        store: Arc<LocalStore>,
        remote: Arc<dyn RemoteWorkoutStore>,
        oracle: Arc<dyn ConnectivityOracle>,
        processor: Arc<SyncProcessor>,
        policy: SyncPolicy,
    ) -> Self {
        Self {
            store,
            remote,
            oracle,
            processor,
            policy,
        }
    }

    /// Persist a new record.
    ///
    /// The local write is the commit point: once the record is cached under
    /// its temporary identity, the call has succeeded from the author's
    /// point of view. The remote create is queued (a queueing failure is
    /// logged, not surfaced; local durability is primary), and a drain is
    /// kicked off opportunistically when reachable. Never blocks on the
    /// network.
    pub async fn save_workout(&self, draft: WorkoutDraft) -> Result<Workout> {
        let workout = draft.clone().into_workout(temp_workout_id());
        self.store.prepend_workout(workout.clone()).await?;
        debug!(
            "[Workouts] saved {} locally ({})",
            workout.id,
            workout.category()
        );

        self.enqueue_tolerant(
            QueueWriteRequest::create(draft, workout.id.as_str()),
            &workout.id,
        )
        .await;
        Ok(workout)
    }

    /// Queue a mutation without failing the caller's write; sync failures
    /// are only ever observable through the status notifier.
    async fn enqueue_tolerant(&self, request: QueueWriteRequest, record_id: &str) {
        match self.store.enqueue(request).await {
            Ok(_) => self.trigger_sync_if_reachable(),
            Err(err) => warn!("[Workouts] could not queue sync for {record_id}: {err}"),
        }
    }

    /// Replace an existing record's content, keeping its identity.
    ///
    /// A record still carrying a temporary identity has never reached the
    /// remote store, so its pending create is cancelled and re-queued with
    /// the new content; a confirmed record queues an update.
    pub async fn update_workout(&self, id: &str, draft: WorkoutDraft) -> Result<Workout> {
        let category = draft.category();
        let updated = draft.clone().into_workout(id);

        let mut cached = self.store.workouts(category).await;
        match cached.iter_mut().find(|workout| workout.id == id) {
            Some(slot) => *slot = updated.clone(),
            None => cached.insert(0, updated.clone()),
        }
        self.store.put_workouts(category, &cached).await?;

        if updated.has_local_id() {
            if let Err(err) = self.store.cancel_queued_record(&updated.id).await {
                warn!("[Workouts] could not cancel stale create for {}: {err}", updated.id);
            }
            self.enqueue_tolerant(
                QueueWriteRequest::create(draft, updated.id.as_str()),
                &updated.id,
            )
            .await;
        } else {
            self.enqueue_tolerant(QueueWriteRequest::update(draft), &updated.id)
                .await;
        }
        Ok(updated)
    }

    /// Merged read for one owner and category, newest first, truncated to
    /// `cap` (policy default when absent).
    ///
    /// Reachable: query the remote store, merge with the local cache
    /// (remote wins, unsynced locals survive), refresh the cache, and drop
    /// local temp records the remote has since confirmed. Unreachable, or
    /// on any remote failure: serve the cache. The filter applies after the
    /// merge either way.
    pub async fn get_workouts(
        &self,
        category: Category,
        owner_id: &str,
        filter: &WorkoutFilter,
        cap: Option<usize>,
    ) -> Result<Vec<Workout>> {
        filter.validate()?;
        let cap = cap.unwrap_or(self.policy.query_cap);

        let cached = self.store.workouts(category).await;
        let owned = |records: Vec<Workout>| -> Vec<Workout> {
            records
                .into_iter()
                .filter(|workout| workout.owner_id == owner_id)
                .collect()
        };

        let mut merged = if self.oracle.is_connected() {
            match self.remote.query_by_owner(category, owner_id, cap).await {
                Ok(remote) => {
                    let kept = self.refresh_cache(category, &remote, cached).await;
                    merge_remote_local(remote, owned(kept))
                }
                Err(err) => {
                    warn!("[Workouts] remote query failed, serving cache: {err}");
                    owned(cached)
                }
            }
        } else {
            owned(cached)
        };

        merged.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        merged.retain(|workout| filter.matches(workout));
        merged.truncate(cap);
        Ok(merged)
    }

    /// Fold remote results into the cached collection by identity and
    /// retire temp records the remote has confirmed. Returns the surviving
    /// pre-refresh records for the merge step.
    async fn refresh_cache(
        &self,
        category: Category,
        remote: &[Workout],
        cached: Vec<Workout>,
    ) -> Vec<Workout> {
        let (superseded, kept): (Vec<Workout>, Vec<Workout>) = cached
            .into_iter()
            .partition(|workout| superseded_by_remote(workout, remote));
        for workout in &superseded {
            debug!("[Workouts] {} confirmed remotely, retiring temp record", workout.id);
        }

        let mut refreshed = kept.clone();
        for record in remote {
            match refreshed.iter_mut().find(|cached| cached.id == record.id) {
                Some(slot) => *slot = record.clone(),
                None => refreshed.push(record.clone()),
            }
        }
        if let Err(err) = self.store.put_workouts(category, &refreshed).await {
            warn!("[Workouts] cache refresh failed: {err}");
        }
        kept
    }

    /// Delete a record by identity.
    ///
    /// The record leaves the local cache immediately. A temporary identity
    /// means the remote store never saw it, so the pending create is
    /// cancelled instead of queueing a delete. Returns whether a cached
    /// record was actually removed.
    pub async fn delete_workout(
        &self,
        category: Category,
        id: &str,
        owner_id: &str,
    ) -> Result<bool> {
        let cached = self.store.workouts(category).await;
        let target = cached.iter().find(|workout| workout.id == id).cloned();

        let removed = self.store.remove_workout(category, id).await?;
        match target {
            Some(workout) if workout.has_local_id() => {
                if let Err(err) = self.store.cancel_queued_record(&workout.id).await {
                    warn!("[Workouts] could not cancel pending create for {id}: {err}");
                }
            }
            _ => {
                self.enqueue_tolerant(QueueWriteRequest::delete(category, id, owner_id), id)
                    .await;
            }
        }
        Ok(removed)
    }

    /// Aggregate for one owner and category.
    ///
    /// Prefers the server-side rollup, falling back to the cached snapshot,
    /// falling back to a rollup computed from the local cache. Never fails;
    /// an owner with no records gets the zero rollup.
    pub async fn get_stats(&self, category: Category, owner_id: &str) -> WorkoutStats {
        if self.oracle.is_connected() {
            match self.remote.fetch_stats(category, owner_id).await {
                Ok(Some(stats)) => {
                    if let Err(err) = self.store.cache_stats(category, owner_id, &stats).await {
                        warn!("[Workouts] stats cache write failed: {err}");
                    }
                    return stats;
                }
                Ok(None) => {}
                Err(err) => warn!("[Workouts] remote stats fetch failed: {err}"),
            }
        }

        if let Some(stats) = self.store.cached_stats(category, owner_id).await {
            return stats;
        }

        let local: Vec<Workout> = self
            .store
            .workouts(category)
            .await
            .into_iter()
            .filter(|workout| workout.owner_id == owner_id)
            .collect();
        WorkoutStats::from_workouts(&local).unwrap_or_default()
    }

    /// User-triggered drain of the sync queue.
    pub async fn force_sync(&self) -> SyncReport {
        self.processor.force_sync().await
    }

    pub async fn sync_info(&self) -> SyncInfo {
        self.processor.sync_info().await
    }

    /// Fire-and-forget drain when reachable. Write paths call this so a
    /// connected author sees their record sync within moments, without the
    /// write blocking on it.
    fn trigger_sync_if_reachable(&self) {
        if !self.oracle.is_connected() {
            return;
        }
        let processor = Arc::clone(&self.processor);
        tokio::spawn(async move {
            processor.process_queue().await;
        });
    }
}
