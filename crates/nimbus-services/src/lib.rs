//! Local persistence for the Nimbus home screen.

pub mod kv_store;
pub mod last_location;

pub use kv_store::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StoreResult};
pub use last_location::{LastLocationStore, DEFAULT_CITY_KEY};
pub use nimbus_core::StoreError;
