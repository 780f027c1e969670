//! Sync domain: queue models, status broadcasting, and the queue processor.

mod adapter;
mod model;
mod notifier;
mod policy;
mod processor;

pub use adapter::*;
pub use model::*;
pub use notifier::*;
pub use policy::*;
pub use processor::*;
