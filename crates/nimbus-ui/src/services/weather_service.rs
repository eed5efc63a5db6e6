//! Weather backend: async location search and forecast fetching.
//! All network work runs off the controller; results sent via mpsc.

use std::sync::Arc;

use nimbus_weather::{ForecastFetcher, Location, LocationResolver, ProviderError, WeatherSnapshot};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;

/// What caused a forecast request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrigin {
    /// Initial load from the stored or default city
    Mount,
    /// User picked a search candidate; persisted on success
    Selection,
}

/// A forecast request as issued by the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRequest {
    pub seq: u64,
    pub city: String,
    pub days: u8,
    pub origin: FetchOrigin,
}

/// Messages sent from async operations back to the screen controller
#[derive(Debug)]
pub enum WeatherServiceMessage {
    /// The search box went quiet with this text. `generation` identifies
    /// the edit that produced it.
    QuerySettled { generation: u64, query: String },
    /// Result of a location search
    SearchDone {
        seq: u64,
        query: String,
        result: Result<Vec<Location>, ProviderError>,
    },
    /// Result of a forecast fetch
    ForecastDone {
        request: ForecastRequest,
        result: Result<WeatherSnapshot, ProviderError>,
    },
}

/// Fetch the forecast for `request.city` asynchronously.
/// Sends `ForecastDone` on the channel when complete.
pub fn request_fetch(
    tx: &UnboundedSender<WeatherServiceMessage>,
    runtime: &Handle,
    fetcher: Arc<dyn ForecastFetcher>,
    request: ForecastRequest,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        let result = fetcher.fetch(&request.city, request.days).await;
        if tx
            .send(WeatherServiceMessage::ForecastDone { request, result })
            .is_err()
        {
            tracing::debug!("Screen dropped before forecast completed");
        }
    });
}

/// Resolve `query` into candidate locations asynchronously.
/// Sends `SearchDone` on the channel when complete.
pub fn request_search(
    tx: &UnboundedSender<WeatherServiceMessage>,
    runtime: &Handle,
    resolver: Arc<dyn LocationResolver>,
    seq: u64,
    query: String,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        let result = resolver.search(&query).await;
        if tx
            .send(WeatherServiceMessage::SearchDone { seq, query, result })
            .is_err()
        {
            tracing::debug!("Screen dropped before search completed");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    struct EchoResolver;

    #[async_trait]
    impl LocationResolver for EchoResolver {
        async fn search(&self, query: &str) -> Result<Vec<Location>, ProviderError> {
            Ok(vec![Location::new(query, "", "Nowhere")])
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl ForecastFetcher for FailingFetcher {
        async fn fetch(&self, _city: &str, _days: u8) -> Result<WeatherSnapshot, ProviderError> {
            Err(ProviderError::Timeout)
        }
    }

    #[tokio::test]
    async fn search_result_carries_sequence_and_query() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        request_search(&tx, &Handle::current(), Arc::new(EchoResolver), 4, "Oslo".into());

        match rx.recv().await {
            Some(WeatherServiceMessage::SearchDone { seq, query, result }) => {
                assert_eq!(seq, 4);
                assert_eq!(query, "Oslo");
                assert_eq!(result.unwrap()[0].name, "Oslo");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn fetch_error_is_delivered_with_request() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let request = ForecastRequest {
            seq: 9,
            city: "Lima".into(),
            days: 7,
            origin: FetchOrigin::Selection,
        };
        request_fetch(&tx, &Handle::current(), Arc::new(FailingFetcher), request.clone());

        match rx.recv().await {
            Some(WeatherServiceMessage::ForecastDone { request: got, result }) => {
                assert_eq!(got, request);
                assert_eq!(result.unwrap_err(), ProviderError::Timeout);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }
}
