//! HTTP implementation of the sync core's remote store contract.
//!
//! Talks to the workout REST API with bearer authentication. Calls are
//! bounded by a request timeout and never retried here; retry policy
//! belongs to the queue processor.

mod client;
mod types;

pub use client::WorkoutApiClient;
