//! Read-path merge of remote-confirmed and locally cached records.

use std::collections::HashMap;

use super::model::Workout;

/// Merge remote results with local cache contents, deduplicating by
/// identity.
///
/// Remote records win: a record that has synced is represented by its
/// authoritative copy, never a stale local duplicate. Local records survive
/// only when they carry a temporary identity (authored offline, not yet
/// reconciled) or are unknown remotely. Output order is unspecified; the
/// read path sorts afterwards.
pub fn merge_remote_local(remote: Vec<Workout>, local: Vec<Workout>) -> Vec<Workout> {
    let mut by_id: HashMap<String, Workout> =
        HashMap::with_capacity(remote.len() + local.len());
    for workout in remote {
        by_id.insert(workout.id.clone(), workout);
    }
    for workout in local {
        if workout.has_local_id() || !by_id.contains_key(&workout.id) {
            by_id.insert(workout.id.clone(), workout);
        }
    }
    by_id.into_values().collect()
}

/// Whether a temporary-id record has been superseded by a remote-confirmed
/// record carrying the same authoring timestamps for the same owner.
///
/// This is how a temporary identity dies: never mutated in place, only
/// replaced once the authoritative copy shows up in a remote query.
pub fn superseded_by_remote(local: &Workout, remote: &[Workout]) -> bool {
    local.has_local_id()
        && remote.iter().any(|candidate| {
            candidate.owner_id == local.owner_id
                && candidate.started_at == local.started_at
                && candidate.created_at == local.created_at
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workouts::{RunType, WorkoutDetails, WorkoutDraft};

    fn record(id: &str, started_at: i64, notes: &str) -> Workout {
        WorkoutDraft {
            owner_id: "user-1".to_string(),
            started_at,
            ended_at: None,
            duration_secs: 600,
            notes: Some(notes.to_string()),
            rating: None,
            created_at: started_at,
            details: WorkoutDetails::Running {
                run_type: RunType::FreeRun,
                distance_meters: 1_000.0,
                average_pace_secs_per_km: None,
                calories: None,
                elevation_gain: None,
                route: vec![],
            },
        }
        .into_workout(id)
    }

    #[test]
    fn remote_copy_wins_over_local_copy_with_same_id() {
        let remote = vec![record("w-1", 10, "remote")];
        let local = vec![record("w-1", 10, "stale local")];

        let merged = merge_remote_local(remote, local);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].notes.as_deref(), Some("remote"));
    }

    #[test]
    fn unsynced_local_records_survive_the_merge() {
        let remote = vec![record("w-1", 10, "remote")];
        let local = vec![record("local_5_abc", 20, "offline")];

        let mut merged = merge_remote_local(remote, local);
        merged.sort_by_key(|w| w.started_at);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].id, "local_5_abc");
    }

    #[test]
    fn local_only_records_survive_the_merge() {
        let merged = merge_remote_local(vec![], vec![record("w-9", 10, "cached")]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, "w-9");
    }

    #[test]
    fn supersession_requires_matching_owner_and_timestamps() {
        let local = record("local_5_abc", 10, "offline");
        let confirmed = record("w-1", 10, "confirmed");
        assert!(superseded_by_remote(&local, std::slice::from_ref(&confirmed)));

        let other_time = record("w-2", 11, "other");
        assert!(!superseded_by_remote(&local, &[other_time]));

        // Permanent ids are never superseded.
        let permanent = record("w-3", 10, "synced");
        assert!(!superseded_by_remote(&permanent, &[confirmed]));
    }
}
