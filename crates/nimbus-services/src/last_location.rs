//! The last city the user confirmed, kept across sessions.

use std::sync::Arc;

use nimbus_core::StoreError;

use crate::kv_store::KeyValueStore;

/// Key the city has always been stored under.
pub const DEFAULT_CITY_KEY: &str = "city";

/// Single-key view over a [`KeyValueStore`].
///
/// `get`/`set` never fail: read errors look like "nothing stored" and write
/// errors are logged. Use `try_get`/`try_set` to see the errors.
#[derive(Clone)]
pub struct LastLocationStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl std::fmt::Debug for LastLocationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LastLocationStore")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl LastLocationStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, DEFAULT_CITY_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Stored city, or `None` if nothing usable is stored.
    pub fn get(&self) -> Option<String> {
        match self.try_get() {
            Ok(city) => city,
            Err(e) => {
                tracing::warn!("Failed to read last city, treating as unset: {}", e);
                None
            }
        }
    }

    /// Persist `city_name`; failures are logged and swallowed.
    pub fn set(&self, city_name: &str) {
        if let Err(e) = self.try_set(city_name) {
            tracing::warn!("Failed to save last city {:?}: {}", city_name, e);
        }
    }

    /// Stored city; blank values count as unset.
    pub fn try_get(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .store
            .get(&self.key)?
            .filter(|city| !city.trim().is_empty()))
    }

    pub fn try_set(&self, city_name: &str) -> Result<(), StoreError> {
        self.store.set(&self.key, city_name)?;
        tracing::debug!("Saved last city {:?}", city_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv_store::{MemoryKeyValueStore, StoreResult};

    /// Store whose every operation fails.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> StoreResult<Option<String>> {
            Err(StoreError::Read("disk on fire".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::Write("disk on fire".into()))
        }
    }

    #[test]
    fn test_empty_store_has_no_city() {
        let store = LastLocationStore::new(Arc::new(MemoryKeyValueStore::new()));
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_set_then_get() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let store = LastLocationStore::new(kv.clone());
        store.set("London");

        assert_eq!(store.get().as_deref(), Some("London"));
        assert_eq!(kv.get("city").unwrap().as_deref(), Some("London"));
    }

    #[test]
    fn test_custom_key() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let store = LastLocationStore::with_key(kv.clone(), "home.city");
        store.set("Oslo");

        assert_eq!(kv.get("home.city").unwrap().as_deref(), Some("Oslo"));
        assert_eq!(kv.get("city").unwrap(), None);
    }

    #[test]
    fn test_blank_value_counts_as_unset() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        kv.set("city", "  ").unwrap();
        let store = LastLocationStore::new(kv);
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_read_failure_reads_as_unset() {
        let store = LastLocationStore::new(Arc::new(BrokenStore));
        assert_eq!(store.get(), None);
        assert!(matches!(store.try_get(), Err(StoreError::Read(_))));
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let store = LastLocationStore::new(Arc::new(BrokenStore));
        store.set("Paris");
        assert!(matches!(store.try_set("Paris"), Err(StoreError::Write(_))));
    }
}
