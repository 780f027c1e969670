//! Per-user, per-category rollups cached for offline display.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::model::Workout;

/// Aggregate counters for one owner within one category.
///
/// The server keeps the authoritative copy and folds in each record on
/// create; this local mirror converges eventually and is never
/// authoritative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutStats {
    pub total_workouts: u32,
    pub total_duration_secs: i64,
    pub total_distance_meters: f64,
    pub total_calories: f64,
    pub total_volume_kg: f64,
    pub longest_distance_meters: f64,
    pub longest_duration_secs: i64,
    pub avg_duration_secs: f64,
    pub avg_distance_meters: f64,
    pub workouts_by_subtype: HashMap<String, u32>,
}

impl WorkoutStats {
    /// Fold one record into the rollup.
    pub fn accumulate(&mut self, workout: &Workout) {
        self.total_workouts += 1;
        self.total_duration_secs += workout.duration_secs;
        self.longest_duration_secs = self.longest_duration_secs.max(workout.duration_secs);

        if let Some(distance) = workout.details.distance_meters() {
            self.total_distance_meters += distance;
            if distance > self.longest_distance_meters {
                self.longest_distance_meters = distance;
            }
        }
        if let Some(calories) = workout.details.calories() {
            self.total_calories += calories;
        }
        if let Some(volume) = workout.details.total_volume_kg() {
            self.total_volume_kg += volume;
        }
        if let Some(subtype) = workout.details.subtype() {
            *self
                .workouts_by_subtype
                .entry(subtype.to_string())
                .or_insert(0) += 1;
        }

        let n = f64::from(self.total_workouts);
        self.avg_duration_secs = self.total_duration_secs as f64 / n;
        self.avg_distance_meters = self.total_distance_meters / n;
    }

    /// Compute a rollup from locally cached records. `None` when there is
    /// nothing to aggregate.
    pub fn from_workouts(workouts: &[Workout]) -> Option<WorkoutStats> {
        if workouts.is_empty() {
            return None;
        }
        let mut stats = WorkoutStats::default();
        for workout in workouts {
            stats.accumulate(workout);
        }
        Some(stats)
    }
}
