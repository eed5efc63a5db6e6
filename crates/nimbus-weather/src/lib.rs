//! Weather data for the Nimbus home screen
//!
//! City search and multi-day forecasts from WeatherAPI.com, behind the
//! `LocationResolver` and `ForecastFetcher` traits so the screen can be driven
//! by any provider.

pub mod client;
mod models;
pub mod provider;
pub mod retry;
pub mod types;

pub use client::WeatherApiClient;
pub use nimbus_core::ProviderError;
pub use provider::{ForecastFetcher, LocationResolver};
pub use retry::RetryPolicy;
pub use types::*;
