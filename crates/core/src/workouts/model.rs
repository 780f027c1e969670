//! Workout record models shared by the local store, the sync queue, and the
//! remote adapter.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix marking a locally-minted identity not yet confirmed by the remote
/// store.
pub const LOCAL_ID_PREFIX: &str = "local_";

/// Closed set of record categories. Each category has its own local
/// collection, remote collection, and aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Running,
    Cycling,
    Strength,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Running, Category::Cycling, Category::Strength];

    /// Stable name used in storage keys and API paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Running => "running",
            Category::Cycling => "cycling",
            Category::Strength => "strength",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sampled point of a recorded route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePoint {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    /// Epoch milliseconds.
    pub timestamp: i64,
    /// Meters from the start of the session.
    pub distance_from_start: f64,
    pub elapsed_secs: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunType {
    FreeRun,
    TempoRun,
    Interval,
    LongRun,
}

impl RunType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunType::FreeRun => "free_run",
            RunType::TempoRun => "tempo_run",
            RunType::Interval => "interval",
            RunType::LongRun => "long_run",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideType {
    FreeRide,
    Commute,
    Training,
}

impl RideType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RideType::FreeRide => "free_ride",
            RideType::Commute => "commute",
            RideType::Training => "training",
        }
    }
}

/// One set performed within a strength exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSet {
    pub set_number: u32,
    pub weight_kg: f64,
    pub reps: u32,
    pub completed: bool,
}

/// One exercise performed within a strength session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseEntry {
    pub exercise_id: String,
    pub name: String,
    pub sets: Vec<ExerciseSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Category-specific payload extension of a workout record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum WorkoutDetails {
    #[serde(rename_all = "camelCase")]
    Running {
        run_type: RunType,
        distance_meters: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        average_pace_secs_per_km: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        calories: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        elevation_gain: Option<f64>,
        #[serde(default)]
        route: Vec<RoutePoint>,
    },
    #[serde(rename_all = "camelCase")]
    Cycling {
        ride_type: RideType,
        distance_meters: f64,
        average_speed_kmh: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_speed_kmh: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        calories: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        elevation_gain: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        elevation_loss: Option<f64>,
        #[serde(default)]
        route: Vec<RoutePoint>,
    },
    #[serde(rename_all = "camelCase")]
    Strength {
        exercises: Vec<ExerciseEntry>,
        total_volume_kg: f64,
        total_sets: u32,
        total_reps: u32,
    },
}

impl WorkoutDetails {
    pub fn category(&self) -> Category {
        match self {
            WorkoutDetails::Running { .. } => Category::Running,
            WorkoutDetails::Cycling { .. } => Category::Cycling,
            WorkoutDetails::Strength { .. } => Category::Strength,
        }
    }

    /// Subtype used for exact-match filtering. Strength sessions have none.
    pub fn subtype(&self) -> Option<&'static str> {
        match self {
            WorkoutDetails::Running { run_type, .. } => Some(run_type.as_str()),
            WorkoutDetails::Cycling { ride_type, .. } => Some(ride_type.as_str()),
            WorkoutDetails::Strength { .. } => None,
        }
    }

    /// Distance metric for range filters. Strength sessions have none.
    pub fn distance_meters(&self) -> Option<f64> {
        match self {
            WorkoutDetails::Running {
                distance_meters, ..
            }
            | WorkoutDetails::Cycling {
                distance_meters, ..
            } => Some(*distance_meters),
            WorkoutDetails::Strength { .. } => None,
        }
    }

    pub fn calories(&self) -> Option<f64> {
        match self {
            WorkoutDetails::Running { calories, .. }
            | WorkoutDetails::Cycling { calories, .. } => *calories,
            WorkoutDetails::Strength { .. } => None,
        }
    }

    pub fn total_volume_kg(&self) -> Option<f64> {
        match self {
            WorkoutDetails::Strength {
                total_volume_kg, ..
            } => Some(*total_volume_kg),
            _ => None,
        }
    }
}

/// A fully persisted workout record.
///
/// `id` is always present: the write path mints a `local_` identity
/// immediately, and the remote store's permanent identity supersedes it via
/// cache refresh; a temporary identity is never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: String,
    pub owner_id: String,
    /// Epoch milliseconds, client-set at authoring time.
    pub started_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<i64>,
    pub duration_secs: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    /// Epoch milliseconds, client-set at authoring time.
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(flatten)]
    pub details: WorkoutDetails,
}

impl Workout {
    pub fn category(&self) -> Category {
        self.details.category()
    }

    /// True while the record carries a locally-minted identity.
    pub fn has_local_id(&self) -> bool {
        self.id.starts_with(LOCAL_ID_PREFIX)
    }
}

/// A record authored locally, before any identity exists.
///
/// Also the exact payload shape the remote store accepts on create: the
/// temporary identity is deliberately excluded so the backing store mints
/// the permanent one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDraft {
    pub owner_id: String,
    pub started_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<i64>,
    pub duration_secs: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    pub created_at: i64,
    #[serde(flatten)]
    pub details: WorkoutDetails,
}

impl WorkoutDraft {
    pub fn category(&self) -> Category {
        self.details.category()
    }

    /// Attach an identity, producing a persistable record.
    pub fn into_workout(self, id: impl Into<String>) -> Workout {
        Workout {
            id: id.into(),
            owner_id: self.owner_id,
            started_at: self.started_at,
            ended_at: self.ended_at,
            duration_secs: self.duration_secs,
            notes: self.notes,
            rating: self.rating,
            created_at: self.created_at,
            updated_at: None,
            details: self.details,
        }
    }
}

/// Mint a temporary identity for a record not yet confirmed remotely.
pub fn temp_workout_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}{}_{}",
        LOCAL_ID_PREFIX,
        Utc::now().timestamp_millis(),
        &suffix[..8]
    )
}
