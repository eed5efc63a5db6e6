//! WeatherAPI.com HTTP client.

use std::sync::Arc;

use async_trait::async_trait;
use nimbus_core::{ProviderConfig, ProviderError, MAX_FORECAST_DAYS};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::models::{
    ApiErrorEnvelope, ApiForecastResponse, ApiSearchResult, KEY_ERRORS, NO_MATCHING_LOCATION,
};
use crate::provider::{ForecastFetcher, LocationResolver};
use crate::retry::{with_retry, RetryPolicy};
use crate::types::{Location, WeatherSnapshot};

const USER_AGENT: &str = concat!("nimbus/", env!("CARGO_PKG_VERSION"));

/// Client for the search and forecast endpoints.
///
/// Implements both [`LocationResolver`] and [`ForecastFetcher`].
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
    retry: RetryPolicy,
}

impl WeatherApiClient {
    /// Build a client from provider settings.
    ///
    /// Fails with `ProviderError::Unauthorized` when no API key is configured.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .resolved_api_key()
            .ok_or_else(|| ProviderError::Unauthorized("no API key configured".to_string()))?;

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProviderError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            retry: RetryPolicy::from_config(config),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base}/{endpoint}` with the key and `params`, retrying transient failures.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!(url = %url, "Requesting");

        let client = &self.client;
        let url = url.as_str();
        let key = self.api_key.as_str();

        with_retry(&self.retry, move || async move {
            let response = client
                .get(url)
                .query(&[("key", key)])
                .query(params)
                .send()
                .await
                .map_err(map_transport_error)?;

            handle_response(response).await
        })
        .await
    }
}

/// Classify a reqwest failure that happened before a status was received.
fn map_transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else if e.is_decode() {
        ProviderError::InvalidResponse(e.to_string())
    } else {
        ProviderError::ConnectionFailed(e.to_string())
    }
}

async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
    let status = response.status();

    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()));
    }

    let body = response.text().await.unwrap_or_default();
    Err(error_from_status(status, &body))
}

/// Map a non-success status (and the provider's error body, if any) to an error.
fn error_from_status(status: StatusCode, body: &str) -> ProviderError {
    let api_error = serde_json::from_str::<ApiErrorEnvelope>(body)
        .ok()
        .map(|env| env.error);

    if let Some(err) = &api_error {
        if err.code == NO_MATCHING_LOCATION {
            return ProviderError::LocationNotFound(err.message.clone());
        }
        if KEY_ERRORS.contains(&err.code) {
            return ProviderError::Unauthorized(err.message.clone());
        }
    }

    let message = api_error
        .as_ref()
        .map(|e| e.message.clone())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string());

    match status {
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Unauthorized(message),
        s if s.is_server_error() || s == StatusCode::REQUEST_TIMEOUT => {
            ProviderError::ServerError {
                status: s.as_u16(),
                message,
            }
        }
        s => match api_error {
            Some(err) => ProviderError::Api {
                code: err.code,
                message: err.message,
            },
            None => ProviderError::ServerError {
                status: s.as_u16(),
                message,
            },
        },
    }
}

#[async_trait]
impl LocationResolver for WeatherApiClient {
    #[instrument(skip(self), level = "info")]
    async fn search(&self, query: &str) -> Result<Vec<Location>, ProviderError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ProviderError::invalid_request("search query is empty"));
        }

        let results: Vec<ApiSearchResult> = self
            .get_json("search.json", &[("q", query.to_string())])
            .await?;

        let locations: Vec<Location> = results
            .into_iter()
            .filter(|r| !r.name.trim().is_empty())
            .map(Location::from)
            .collect();

        tracing::debug!("Search {:?} returned {} locations", query, locations.len());
        Ok(locations)
    }
}

#[async_trait]
impl ForecastFetcher for WeatherApiClient {
    #[instrument(skip(self), level = "info")]
    async fn fetch(&self, city_name: &str, days: u8) -> Result<WeatherSnapshot, ProviderError> {
        let city_name = city_name.trim();
        if city_name.is_empty() {
            return Err(ProviderError::invalid_request("city name is empty"));
        }
        if days == 0 {
            return Err(ProviderError::invalid_request("forecast needs at least one day"));
        }
        let days = days.min(MAX_FORECAST_DAYS);

        let response: ApiForecastResponse = self
            .get_json(
                "forecast.json",
                &[
                    ("q", city_name.to_string()),
                    ("days", days.to_string()),
                    ("aqi", "no".to_string()),
                    ("alerts", "no".to_string()),
                ],
            )
            .await?;

        WeatherSnapshot::try_from(response)
    }
}
