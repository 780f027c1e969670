//! Offline-first workout sync core.
//!
//! Records are written to durable local storage first, queued for remote
//! reconciliation, and drained against the backing store whenever
//! connectivity allows. Reads merge remote-confirmed records with the local
//! cache so data authored offline stays visible.
//!
//! All services are explicitly constructed and dependency-injected; there is
//! no process-global state.

pub mod connectivity;
pub mod errors;
pub mod store;
pub mod sync;
pub mod utils;
pub mod workouts;

pub use errors::{Error, Result};

#[cfg(test)]
pub(crate) mod test_support;
