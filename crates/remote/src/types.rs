//! Wire types specific to the workout API.
//!
//! Workout records and stats travel in the core model shapes; only the
//! envelope types live here.

use serde::Deserialize;

/// Error envelope returned by the API on non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub code: String,
    pub message: String,
}

/// Response to a workout create; the body carries only the minted identity.
#[derive(Debug, Deserialize)]
pub(crate) struct CreateWorkoutResponse {
    pub id: String,
}
