//! Sync queue and status models.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::workouts::{Category, WorkoutDraft};

/// Process-wide sync state broadcast to observers. Only the processor and
/// the connectivity listener drive transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// No known pending work, or the last drain settled cleanly.
    Idle,
    /// A drain pass is in flight.
    Syncing,
    /// The most recent drain ended with at least one failure outstanding.
    Error,
    /// The connectivity oracle reports unreachable.
    Offline,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncStatus::Idle => "idle",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Error => "error",
            SyncStatus::Offline => "offline",
        };
        f.write_str(name)
    }
}

/// Pending remote mutation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    Create,
    Update,
    Delete,
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncAction::Create => "create",
            SyncAction::Update => "update",
            SyncAction::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Payload carried by a queue item. Records travel by value; the local
/// store's copy stays independent of queue processing. Deletes carry only
/// the permanent identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueuePayload {
    Record(WorkoutDraft),
    Delete { id: String },
}

/// One pending remote mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncQueueItem {
    /// Server-independent identity minted at enqueue time.
    pub id: String,
    pub category: Category,
    pub action: SyncAction,
    pub payload: QueuePayload,
    /// Kept redundantly for future owner-based partitioning.
    pub owner_id: String,
    /// Temporary identity of the cached record this mutation belongs to,
    /// kept so a later local edit or delete can cancel the item before it
    /// syncs. Absent for records with a permanent identity.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub local_id: Option<String>,
    /// Epoch milliseconds; drains apply items in non-decreasing order.
    pub enqueued_at: i64,
    /// Only ever increases; the item is evicted at the policy ceiling.
    pub retry_count: u32,
}

/// Enqueue request missing the store-generated fields (identity, enqueue
/// timestamp, retry counter).
#[derive(Debug, Clone)]
pub struct QueueWriteRequest {
    pub category: Category,
    pub action: SyncAction,
    pub payload: QueuePayload,
    pub owner_id: String,
    pub local_id: Option<String>,
}

impl QueueWriteRequest {
    /// Create for a record still cached under its temporary identity.
    pub fn create(draft: WorkoutDraft, local_id: impl Into<String>) -> Self {
        Self {
            category: draft.category(),
            action: SyncAction::Create,
            owner_id: draft.owner_id.clone(),
            payload: QueuePayload::Record(draft),
            local_id: Some(local_id.into()),
        }
    }

    pub fn update(draft: WorkoutDraft) -> Self {
        Self {
            category: draft.category(),
            action: SyncAction::Update,
            owner_id: draft.owner_id.clone(),
            payload: QueuePayload::Record(draft),
            local_id: None,
        }
    }

    pub fn delete(
        category: Category,
        id: impl Into<String>,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            category,
            action: SyncAction::Delete,
            payload: QueuePayload::Delete { id: id.into() },
            owner_id: owner_id.into(),
            local_id: None,
        }
    }

    pub(crate) fn into_item(self) -> SyncQueueItem {
        SyncQueueItem {
            id: format!("sync_{}", Uuid::new_v4()),
            category: self.category,
            action: self.action,
            payload: self.payload,
            owner_id: self.owner_id,
            local_id: self.local_id,
            enqueued_at: Utc::now().timestamp_millis(),
            retry_count: 0,
        }
    }
}

/// Outcome of one drain pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub success: usize,
    pub failed: usize,
    /// Outstanding work left in the queue, read fresh after eviction.
    pub pending: usize,
}

impl SyncReport {
    pub(crate) fn pending_only(pending: usize) -> Self {
        Self {
            success: 0,
            failed: 0,
            pending,
        }
    }
}

/// Snapshot of sync state for a UI badge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncInfo {
    pub status: SyncStatus,
    pub pending_count: usize,
    /// Human-readable relative time, or `"never synced"`.
    pub last_sync: String,
    pub is_online: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workouts::{RunType, WorkoutDetails};

    fn draft() -> WorkoutDraft {
        WorkoutDraft {
            owner_id: "user-1".to_string(),
            started_at: 1_000,
            ended_at: None,
            duration_secs: 600,
            notes: None,
            rating: None,
            created_at: 1_000,
            details: WorkoutDetails::Running {
                run_type: RunType::FreeRun,
                distance_meters: 1_000.0,
                average_pace_secs_per_km: None,
                calories: None,
                elevation_gain: None,
                route: vec![],
            },
        }
    }

    #[test]
    fn status_serialization_matches_wire_contract() {
        let statuses = [
            SyncStatus::Idle,
            SyncStatus::Syncing,
            SyncStatus::Error,
            SyncStatus::Offline,
        ];
        let actual = statuses
            .iter()
            .map(|status| serde_json::to_string(status).expect("serialize status"))
            .collect::<Vec<_>>();
        assert_eq!(
            actual,
            vec!["\"idle\"", "\"syncing\"", "\"error\"", "\"offline\""]
        );
    }

    #[test]
    fn enqueue_request_generates_missing_fields() {
        let item = QueueWriteRequest::create(draft(), "local_1_aaa").into_item();
        assert!(item.id.starts_with("sync_"));
        assert_eq!(item.category, Category::Running);
        assert_eq!(item.action, SyncAction::Create);
        assert_eq!(item.owner_id, "user-1");
        assert_eq!(item.local_id.as_deref(), Some("local_1_aaa"));
        assert_eq!(item.retry_count, 0);
        assert!(item.enqueued_at > 0);
    }

    #[test]
    fn delete_request_carries_only_the_identity() {
        let item =
            QueueWriteRequest::delete(Category::Cycling, "w-42", "user-1").into_item();
        assert_eq!(item.action, SyncAction::Delete);
        assert_eq!(item.local_id, None);
        assert_eq!(
            item.payload,
            QueuePayload::Delete {
                id: "w-42".to_string()
            }
        );
    }

    #[test]
    fn queue_item_round_trips_through_json() {
        let item = QueueWriteRequest::create(draft(), "local_1_aaa").into_item();
        let json = serde_json::to_string(&item).expect("serialize");
        let back: SyncQueueItem = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, item);
    }
}
