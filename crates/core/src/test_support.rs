//! Shared fixtures for crate tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::connectivity::ConnectivityHandle;
use crate::errors::{RemoteStoreError, StoreError};
use crate::store::{KeyValueStore, LocalStore, MemoryKeyValueStore};
use crate::sync::{RemoteWorkoutStore, StatusNotifier, SyncPolicy, SyncProcessor};
use crate::workouts::{
    Category, OfflineWorkoutService, RunType, Workout, WorkoutDetails, WorkoutDraft, WorkoutStats,
};

/// Scripted in-memory remote store.
///
/// Failure toggles and a create delay let tests script outage windows and
/// slow calls; attempt counters expose retry behavior.
#[derive(Default)]
pub struct MockRemoteStore {
    records: Mutex<Vec<Workout>>,
    stats: Mutex<HashMap<(Category, String), WorkoutStats>>,
    pub fail_creates: AtomicBool,
    pub fail_deletes: AtomicBool,
    pub fail_queries: AtomicBool,
    pub create_attempts: AtomicUsize,
    pub delete_attempts: AtomicUsize,
    pub create_delay_ms: AtomicU64,
    next_id: AtomicUsize,
}

impl MockRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<Workout> {
        self.records.lock().expect("records lock").clone()
    }

    pub fn insert_record(&self, workout: Workout) {
        self.records.lock().expect("records lock").push(workout);
    }

    pub fn set_stats(&self, category: Category, owner_id: &str, stats: WorkoutStats) {
        self.stats
            .lock()
            .expect("stats lock")
            .insert((category, owner_id.to_string()), stats);
    }
}

#[async_trait]
impl RemoteWorkoutStore for MockRemoteStore {
    async fn create(&self, draft: &WorkoutDraft) -> Result<String, RemoteStoreError> {
        self.create_attempts.fetch_add(1, Ordering::SeqCst);
        let delay = self.create_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(RemoteStoreError::transport("connection refused"));
        }
        let id = format!("w-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.records
            .lock()
            .expect("records lock")
            .push(draft.clone().into_workout(id.clone()));
        Ok(id)
    }

    async fn query_by_owner(
        &self,
        category: Category,
        owner_id: &str,
        cap: usize,
    ) -> Result<Vec<Workout>, RemoteStoreError> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(RemoteStoreError::transport("connection reset"));
        }
        let mut matching: Vec<Workout> = self
            .records
            .lock()
            .expect("records lock")
            .iter()
            .filter(|workout| workout.category() == category && workout.owner_id == owner_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        matching.truncate(cap);
        Ok(matching)
    }

    async fn delete(&self, _category: Category, id: &str) -> Result<(), RemoteStoreError> {
        self.delete_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(RemoteStoreError::api(503, "service unavailable"));
        }
        self.records
            .lock()
            .expect("records lock")
            .retain(|workout| workout.id != id);
        Ok(())
    }

    async fn update_aggregate(&self, workout: &Workout) -> Result<(), RemoteStoreError> {
        let mut stats = self.stats.lock().expect("stats lock");
        stats
            .entry((workout.category(), workout.owner_id.clone()))
            .or_default()
            .accumulate(workout);
        Ok(())
    }

    async fn fetch_stats(
        &self,
        category: Category,
        owner_id: &str,
    ) -> Result<Option<WorkoutStats>, RemoteStoreError> {
        Ok(self
            .stats
            .lock()
            .expect("stats lock")
            .get(&(category, owner_id.to_string()))
            .cloned())
    }
}

/// Backend that starts failing writes after a scripted budget, for
/// exercising write-failure propagation.
pub struct FlakyKeyValueStore {
    inner: MemoryKeyValueStore,
    writes_remaining: AtomicUsize,
}

impl FlakyKeyValueStore {
    pub fn new(writes_allowed: usize) -> Self {
        Self {
            inner: MemoryKeyValueStore::new(),
            writes_remaining: AtomicUsize::new(writes_allowed),
        }
    }
}

#[async_trait]
impl KeyValueStore for FlakyKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.writes_remaining.load(Ordering::SeqCst) == 0 {
            return Err(StoreError::Io("disk full".to_string()));
        }
        self.writes_remaining.fetch_sub(1, Ordering::SeqCst);
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key).await
    }
}

/// Fully wired subsystem over in-memory backends.
pub struct TestEnv {
    pub store: Arc<LocalStore>,
    pub remote: Arc<MockRemoteStore>,
    pub connectivity: Arc<ConnectivityHandle>,
    pub processor: Arc<SyncProcessor>,
    pub service: OfflineWorkoutService,
}

impl TestEnv {
    pub fn online() -> Self {
        Self::with_connectivity(true)
    }

    pub fn offline() -> Self {
        Self::with_connectivity(false)
    }

    pub fn with_connectivity(connected: bool) -> Self {
        let store = Arc::new(LocalStore::new(Arc::new(MemoryKeyValueStore::new())));
        let remote = Arc::new(MockRemoteStore::new());
        let connectivity = Arc::new(ConnectivityHandle::new(connected));
        let policy = SyncPolicy::default();
        let processor = Arc::new(SyncProcessor::new(
            store.clone(),
            remote.clone(),
            connectivity.clone(),
            Arc::new(StatusNotifier::new()),
            policy,
        ));
        let service = OfflineWorkoutService::new(
            store.clone(),
            remote.clone(),
            connectivity.clone(),
            processor.clone(),
            policy,
        );
        Self {
            store,
            remote,
            connectivity,
            processor,
            service,
        }
    }
}

pub fn run_draft(owner: &str, started_at: i64) -> WorkoutDraft {
    WorkoutDraft {
        owner_id: owner.to_string(),
        started_at,
        ended_at: Some(started_at + 1_800_000),
        duration_secs: 1_800,
        notes: None,
        rating: None,
        created_at: started_at + 1_800_000,
        details: WorkoutDetails::Running {
            run_type: RunType::FreeRun,
            distance_meters: 5_000.0,
            average_pace_secs_per_km: Some(360.0),
            calories: Some(400.0),
            elevation_gain: None,
            route: vec![],
        },
    }
}
