//! Seams between the screen and the remote weather provider.

use async_trait::async_trait;
use nimbus_core::ProviderError;

use crate::types::{Location, WeatherSnapshot};

/// Translates a partial place name into candidate locations.
#[async_trait]
pub trait LocationResolver: Send + Sync {
    /// Candidate locations for `query`, in the provider's order.
    ///
    /// Callers are expected to skip queries of two characters or fewer.
    async fn search(&self, query: &str) -> Result<Vec<Location>, ProviderError>;
}

/// Retrieves a multi-day forecast for a resolved city.
#[async_trait]
pub trait ForecastFetcher: Send + Sync {
    /// Current conditions plus `days` days of forecast for `city_name`.
    ///
    /// Fails with `ProviderError::InvalidRequest` for an empty city or zero days.
    async fn fetch(&self, city_name: &str, days: u8) -> Result<WeatherSnapshot, ProviderError>;
}
