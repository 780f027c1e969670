//! SQLite-backed [`KeyValueStore`] implementation.
//!
//! One table, one connection, writes serialized through a mutex and run on
//! the blocking pool. WAL journaling makes committed writes survive process
//! death, which is the durability bar the sync core's write path relies on.
//!
//! [`KeyValueStore`]: trackfit_core::store::KeyValueStore

mod kv;

pub use kv::SqliteKeyValueStore;
