//! Service wiring for the home screen.
//!
//! Builds the provider client and the last-city store from [`Config`] and
//! hands them to screens. Nothing here is global: each `AppServices` owns its
//! own client and store.

use std::sync::Arc;

use tokio::runtime::Handle;

use nimbus_core::{AppError, Config};
use nimbus_services::{KeyValueStore, LastLocationStore, MemoryKeyValueStore, SqliteKeyValueStore};
use nimbus_weather::WeatherApiClient;

use crate::models::{HomeScreenModel, ScreenServices};

pub struct AppServices {
    config: Config,
    client: Arc<WeatherApiClient>,
    last_location: LastLocationStore,
}

impl AppServices {
    /// Connect everything described by `config`.
    ///
    /// A missing API key is an error. An unusable database is not: the
    /// screen still works, it just forgets the city on exit.
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let client = WeatherApiClient::new(&config.provider)?;

        let path = config.storage.effective_database_path();
        let store: Arc<dyn KeyValueStore> = match SqliteKeyValueStore::open(&path) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                tracing::warn!("{}; last city will not be remembered", e);
                Arc::new(MemoryKeyValueStore::new())
            }
        };

        Ok(Self::with_parts(config, Arc::new(client), store))
    }

    /// Assemble from already-built parts.
    pub fn with_parts(
        config: Config,
        client: Arc<WeatherApiClient>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let last_location = LastLocationStore::with_key(store, &config.storage.last_city_key);
        Self {
            config,
            client,
            last_location,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn last_location(&self) -> &LastLocationStore {
        &self.last_location
    }

    pub fn screen_services(&self) -> ScreenServices {
        ScreenServices {
            resolver: self.client.clone(),
            fetcher: self.client.clone(),
            last_location: self.last_location.clone(),
        }
    }

    /// New home screen whose tasks run on `runtime`.
    pub fn home_screen(&self, runtime: Handle) -> HomeScreenModel {
        HomeScreenModel::new(self.screen_services(), self.config.screen.clone(), runtime)
    }
}
