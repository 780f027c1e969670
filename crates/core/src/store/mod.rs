//! Durable local cache: the key-value backend contract and the typed store
//! built on top of it.

mod local;
mod memory;

pub use local::*;
pub use memory::*;

use async_trait::async_trait;

use crate::errors::StoreError;

/// Durable string-keyed, string-valued storage.
///
/// Implementations must make each write durable before returning; the write
/// path treats a returned `Ok` as "survives process death". Values are
/// opaque JSON documents.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
