//! Caller-supplied read filters.

use serde::{Deserialize, Serialize};

use crate::errors::Error;

use super::model::Workout;

/// Optional constraints applied to merged read results. All bounds are
/// inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutFilter {
    /// Exact match on the category subtype (e.g. `"tempo_run"`).
    pub subtype: Option<String>,
    /// Epoch milliseconds, applied to `started_at`.
    pub date_from: Option<i64>,
    pub date_to: Option<i64>,
    pub min_distance_meters: Option<f64>,
    pub max_distance_meters: Option<f64>,
}

impl WorkoutFilter {
    /// Rejects bounds a caller can only produce by mistake.
    pub fn validate(&self) -> Result<(), Error> {
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(Error::InvalidFilter(format!(
                    "dateFrom {from} is after dateTo {to}"
                )));
            }
        }
        for (name, bound) in [
            ("minDistanceMeters", self.min_distance_meters),
            ("maxDistanceMeters", self.max_distance_meters),
        ] {
            if let Some(value) = bound {
                if !value.is_finite() || value < 0.0 {
                    return Err(Error::InvalidFilter(format!(
                        "{name} must be a non-negative number, got {value}"
                    )));
                }
            }
        }
        if let (Some(min), Some(max)) = (self.min_distance_meters, self.max_distance_meters) {
            if min > max {
                return Err(Error::InvalidFilter(format!(
                    "minDistanceMeters {min} is greater than maxDistanceMeters {max}"
                )));
            }
        }
        Ok(())
    }

    /// Whether a record passes every populated constraint. Records without
    /// the named metric fail its range check.
    pub fn matches(&self, workout: &Workout) -> bool {
        if let Some(subtype) = self.subtype.as_deref() {
            if workout.details.subtype() != Some(subtype) {
                return false;
            }
        }
        if let Some(from) = self.date_from {
            if workout.started_at < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if workout.started_at > to {
                return false;
            }
        }
        if self.min_distance_meters.is_some() || self.max_distance_meters.is_some() {
            let Some(distance) = workout.details.distance_meters() else {
                return false;
            };
            if let Some(min) = self.min_distance_meters {
                if distance < min {
                    return false;
                }
            }
            if let Some(max) = self.max_distance_meters {
                if distance > max {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workouts::{RunType, WorkoutDetails, WorkoutDraft};

    fn run(started_at: i64, distance: f64) -> Workout {
        WorkoutDraft {
            owner_id: "user-1".to_string(),
            started_at,
            ended_at: None,
            duration_secs: 1_800,
            notes: None,
            rating: None,
            created_at: started_at,
            details: WorkoutDetails::Running {
                run_type: RunType::FreeRun,
                distance_meters: distance,
                average_pace_secs_per_km: None,
                calories: None,
                elevation_gain: None,
                route: vec![],
            },
        }
        .into_workout(format!("w-{started_at}"))
    }

    fn lift(started_at: i64) -> Workout {
        WorkoutDraft {
            owner_id: "user-1".to_string(),
            started_at,
            ended_at: None,
            duration_secs: 2_400,
            notes: None,
            rating: None,
            created_at: started_at,
            details: WorkoutDetails::Strength {
                exercises: vec![],
                total_volume_kg: 1_200.0,
                total_sets: 12,
                total_reps: 96,
            },
        }
        .into_workout(format!("g-{started_at}"))
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let filter = WorkoutFilter {
            date_from: Some(100),
            date_to: Some(200),
            ..Default::default()
        };
        assert!(filter.matches(&run(100, 1.0)));
        assert!(filter.matches(&run(200, 1.0)));
        assert!(!filter.matches(&run(99, 1.0)));
        assert!(!filter.matches(&run(201, 1.0)));
    }

    #[test]
    fn subtype_is_exact_match() {
        let filter = WorkoutFilter {
            subtype: Some("free_run".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&run(1, 1.0)));
        assert!(!filter.matches(&lift(1)));
    }

    #[test]
    fn distance_range_excludes_records_without_the_metric() {
        let filter = WorkoutFilter {
            min_distance_meters: Some(1_000.0),
            ..Default::default()
        };
        assert!(filter.matches(&run(1, 5_000.0)));
        assert!(!filter.matches(&run(1, 500.0)));
        assert!(!filter.matches(&lift(1)));
    }

    #[test]
    fn inverted_ranges_are_caller_errors() {
        let filter = WorkoutFilter {
            date_from: Some(200),
            date_to: Some(100),
            ..Default::default()
        };
        assert!(matches!(
            filter.validate(),
            Err(Error::InvalidFilter(_))
        ));

        let filter = WorkoutFilter {
            min_distance_meters: Some(-5.0),
            ..Default::default()
        };
        assert!(filter.validate().is_err());

        let filter = WorkoutFilter {
            min_distance_meters: Some(10.0),
            max_distance_meters: Some(1.0),
            ..Default::default()
        };
        assert!(filter.validate().is_err());
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = WorkoutFilter::default();
        assert!(filter.validate().is_ok());
        assert!(filter.matches(&run(1, 0.0)));
        assert!(filter.matches(&lift(1)));
    }
}
