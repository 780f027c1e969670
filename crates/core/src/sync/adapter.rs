//! Remote store adapter contract.

use async_trait::async_trait;

use crate::errors::RemoteStoreError;
use crate::workouts::{Category, Workout, WorkoutDraft, WorkoutStats};

/// Authoritative backing store, one logical collection per category.
///
/// Retry-free contract: each call either succeeds or errors. The queue
/// processor owns all retry policy, so implementations must not retry
/// internally, and should bound every call with a timeout; a hung call
/// stalls the single in-flight drain.
#[async_trait]
pub trait RemoteWorkoutStore: Send + Sync {
    /// Persist a record authored by the write path and return its permanent
    /// identity.
    async fn create(&self, draft: &WorkoutDraft) -> Result<String, RemoteStoreError>;

    /// Up to `cap` records for one owner, most recent first.
    async fn query_by_owner(
        &self,
        category: Category,
        owner_id: &str,
        cap: usize,
    ) -> Result<Vec<Workout>, RemoteStoreError>;

    /// Delete by permanent identity. Deleting an already-deleted record
    /// should not be reported as fatal.
    async fn delete(&self, category: Category, id: &str) -> Result<(), RemoteStoreError>;

    /// Fold a newly created record into the server-side rolling aggregate.
    async fn update_aggregate(&self, workout: &Workout) -> Result<(), RemoteStoreError>;

    /// Server-side aggregate for an owner, if one exists yet.
    async fn fetch_stats(
        &self,
        category: Category,
        owner_id: &str,
    ) -> Result<Option<WorkoutStats>, RemoteStoreError>;
}
