//! Typed facade over the key-value backend.
//!
//! Read policy: a missing, unreadable, or corrupt value degrades to absent
//! with a warning, never an error. Write policy: failures propagate to the
//! caller, who owns the response.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{Result, StoreError};
use crate::sync::{QueueWriteRequest, SyncQueueItem};
use crate::workouts::{Category, Workout, WorkoutStats};

use super::KeyValueStore;

const QUEUE_KEY: &str = "sync_queue";
const LAST_SYNC_KEY: &str = "last_sync";

fn workouts_key(category: Category) -> String {
    format!("{category}_workouts")
}

fn stats_key(category: Category, owner_id: &str) -> String {
    format!("{category}_stats_{owner_id}")
}

/// Local workout cache, sync queue, and sync metadata over one durable
/// backend.
pub struct LocalStore {
    kv: Arc<dyn KeyValueStore>,
}

impl LocalStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.kv.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!("[LocalStore] read of '{key}' failed: {err}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("[LocalStore] corrupt value under '{key}': {err}");
                None
            }
        }
    }

    async fn write_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.kv.set(key, &raw).await?;
        Ok(())
    }

    /// Cached records for one category, newest first. Absent or corrupt
    /// caches read as empty.
    pub async fn workouts(&self, category: Category) -> Vec<Workout> {
        self.read_json(&workouts_key(category)).await.unwrap_or_default()
    }

    /// Replace the cached collection for one category.
    pub async fn put_workouts(&self, category: Category, workouts: &[Workout]) -> Result<()> {
        self.write_json(&workouts_key(category), &workouts).await
    }

    /// Insert a new record at the front of its category cache. A record
    /// already stored under the same identity is replaced in place so a
    /// collection never holds two copies of one identity.
    pub async fn prepend_workout(&self, workout: Workout) -> Result<()> {
        let category = workout.category();
        let mut cached = self.workouts(category).await;
        match cached.iter_mut().find(|existing| existing.id == workout.id) {
            Some(slot) => *slot = workout,
            None => cached.insert(0, workout),
        }
        self.put_workouts(category, &cached).await
    }

    /// Drop one record from its category cache. Returns whether a record
    /// was actually removed.
    pub async fn remove_workout(&self, category: Category, id: &str) -> Result<bool> {
        let mut cached = self.workouts(category).await;
        let before = cached.len();
        cached.retain(|workout| workout.id != id);
        if cached.len() == before {
            return Ok(false);
        }
        self.put_workouts(category, &cached).await?;
        Ok(true)
    }

    /// Pending remote mutations, unordered. Absent or corrupt queues read
    /// as empty.
    pub async fn sync_queue(&self) -> Vec<SyncQueueItem> {
        self.read_json(QUEUE_KEY).await.unwrap_or_default()
    }

    pub async fn pending_count(&self) -> usize {
        self.sync_queue().await.len()
    }

    /// Append a pending mutation and return the stored item.
    pub async fn enqueue(&self, request: QueueWriteRequest) -> Result<SyncQueueItem> {
        let item = request.into_item();
        let mut queue = self.sync_queue().await;
        queue.push(item.clone());
        self.write_json(QUEUE_KEY, &queue).await?;
        Ok(item)
    }

    /// Remove a successfully applied item. Removing an unknown id is an
    /// error so the processor can account for it.
    pub async fn dequeue(&self, id: &str) -> Result<()> {
        let mut queue = self.sync_queue().await;
        let before = queue.len();
        queue.retain(|item| item.id != id);
        if queue.len() == before {
            return Err(StoreError::Corrupt {
                key: QUEUE_KEY.to_string(),
                message: format!("no queue item '{id}' to dequeue"),
            }
            .into());
        }
        self.write_json(QUEUE_KEY, &queue).await
    }

    /// Bump the retry counter of a failed item. Unknown ids are ignored;
    /// the item may already have been evicted.
    pub async fn increment_retry(&self, id: &str) -> Result<()> {
        let mut queue = self.sync_queue().await;
        for item in queue.iter_mut() {
            if item.id == id {
                item.retry_count += 1;
            }
        }
        self.write_json(QUEUE_KEY, &queue).await
    }

    /// Cancel pending mutations for a record that never reached the remote
    /// store, matched by the temporary identity carried on the queue item.
    /// Returns how many items were cancelled.
    pub async fn cancel_queued_record(&self, local_id: &str) -> Result<usize> {
        let queue = self.sync_queue().await;
        let before = queue.len();
        let kept: Vec<SyncQueueItem> = queue
            .into_iter()
            .filter(|item| item.local_id.as_deref() != Some(local_id))
            .collect();
        let cancelled = before - kept.len();
        if cancelled > 0 {
            self.write_json(QUEUE_KEY, &kept).await?;
        }
        Ok(cancelled)
    }

    /// Drop items whose retry counter reached `ceiling`. Returns how many
    /// were dropped.
    pub async fn evict_exhausted(&self, ceiling: u32) -> Result<usize> {
        let queue = self.sync_queue().await;
        let before = queue.len();
        let kept: Vec<SyncQueueItem> = queue
            .into_iter()
            .filter(|item| item.retry_count < ceiling)
            .collect();
        let evicted = before - kept.len();
        if evicted > 0 {
            self.write_json(QUEUE_KEY, &kept).await?;
        }
        Ok(evicted)
    }

    /// Time of the last drain that applied at least one item.
    pub async fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.read_json(LAST_SYNC_KEY).await
    }

    pub async fn mark_synced_now(&self) -> Result<()> {
        self.write_json(LAST_SYNC_KEY, &Utc::now()).await
    }

    /// Most recent aggregate snapshot for one owner and category.
    pub async fn cached_stats(&self, category: Category, owner_id: &str) -> Option<WorkoutStats> {
        self.read_json(&stats_key(category, owner_id)).await
    }

    pub async fn cache_stats(
        &self,
        category: Category,
        owner_id: &str,
        stats: &WorkoutStats,
    ) -> Result<()> {
        self.write_json(&stats_key(category, owner_id), stats).await
    }
}
