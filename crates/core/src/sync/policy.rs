//! Tunable sync policy.
//!
//! The defaults mirror the shipped client behavior; both knobs are policy
//! parameters, not invariants.

/// Failed attempts after which a queue item is evicted.
pub const DEFAULT_RETRY_CEILING: u32 = 5;

/// Per-query record cap on remote reads.
pub const DEFAULT_QUERY_CAP: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPolicy {
    pub retry_ceiling: u32,
    pub query_cap: usize,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            retry_ceiling: DEFAULT_RETRY_CEILING,
            query_cap: DEFAULT_QUERY_CAP,
        }
    }
}
