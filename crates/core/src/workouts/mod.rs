//! Workout domain: record categories, payload models, filters, stats, and
//! the offline-first write/read paths.

mod filter;
mod merge;
mod model;
mod service;
mod stats;

pub use filter::*;
pub use merge::*;
pub use model::*;
pub use service::*;
pub use stats::*;
