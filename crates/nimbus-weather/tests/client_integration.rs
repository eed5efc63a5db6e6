//! Integration tests for WeatherApiClient using wiremock.
//!
//! These tests verify the search and forecast requests against a mock HTTP server.

use nimbus_core::ProviderConfig;
use nimbus_weather::{
    ConditionIcon, ForecastFetcher, LocationResolver, ProviderError, WeatherApiClient,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(mock_server: &MockServer) -> WeatherApiClient {
    let config = ProviderConfig {
        base_url: mock_server.uri(),
        api_key: Some("test-key".to_string()),
        timeout_secs: 5,
        max_retries: 2,
        retry_initial_delay_ms: 1,
        retry_max_delay_ms: 5,
    };
    WeatherApiClient::new(&config).unwrap()
}

fn forecast_body(city: &str, country: &str) -> serde_json::Value {
    serde_json::json!({
        "location": { "name": city, "region": "", "country": country, "lat": 0.0, "lon": 0.0 },
        "current": {
            "temp_c": 18.0,
            "humidity": 71,
            "wind_kph": 9.0,
            "condition": { "text": "Overcast", "icon": "//cdn.weatherapi.com/122.png", "code": 1009 }
        },
        "forecast": {
            "forecastday": [
                {
                    "date": "2024-05-06",
                    "day": { "avgtemp_c": 16.4, "condition": { "text": "Light rain" } },
                    "astro": { "sunrise": "05:34 AM" }
                },
                {
                    "date": "2024-05-07",
                    "day": { "avgtemp_c": 17.9, "condition": { "text": "Sunny" } },
                    "astro": { "sunrise": "05:32 AM" }
                }
            ]
        }
    })
}

#[tokio::test]
async fn test_search_returns_locations_in_provider_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("key", "test-key"))
        .and(query_param("q", "Lon"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": 1, "name": "London", "region": "City of London, Greater London", "country": "United Kingdom" },
            { "id": 2, "name": "Londrina", "region": "Parana", "country": "Brazil" },
            { "id": 3, "name": "London", "region": "Ontario", "country": "Canada" }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let locations = client.search("Lon").await.unwrap();

    assert_eq!(locations.len(), 3);
    assert_eq!(locations[0].name, "London");
    assert_eq!(locations[0].country, "United Kingdom");
    assert_eq!(locations[1].name, "Londrina");
    assert_eq!(locations[2].region, "Ontario");
}

#[tokio::test]
async fn test_search_no_matches() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    assert!(client.search("Qqqzz").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_fetch_forecast_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .and(query_param("q", "Paris"))
        .and(query_param("days", "7"))
        .and(query_param("aqi", "no"))
        .and(query_param("alerts", "no"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body("Paris", "France")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let snapshot = client.fetch("Paris", 7).await.unwrap();

    assert_eq!(snapshot.location.name, "Paris");
    assert_eq!(snapshot.location.country, "France");
    assert_eq!(snapshot.current.humidity, 71);
    assert_eq!(snapshot.current.condition.icon, ConditionIcon::Cloud);
    assert_eq!(snapshot.forecast_days.len(), 2);
    assert_eq!(snapshot.forecast_days[0].condition.icon, ConditionIcon::ModerateRain);
    assert_eq!(snapshot.forecast_days[1].condition.icon, ConditionIcon::Sun);
}

#[tokio::test]
async fn test_fetch_clamps_days_to_provider_maximum() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .and(query_param("days", "14"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body("Oslo", "Norway")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    assert!(client.fetch("Oslo", 30).await.is_ok());
}

#[tokio::test]
async fn test_identical_fetches_yield_equal_snapshots() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body("Rome", "Italy")))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let first = client.fetch("Rome", 3).await.unwrap();
    let second = client.fetch("Rome", 3).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_unknown_city_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": { "code": 1006, "message": "No matching location found." }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client.fetch("Atlantis", 7).await.unwrap_err();

    assert_eq!(
        err,
        ProviderError::LocationNotFound("No matching location found.".to_string())
    );
}

#[tokio::test]
async fn test_invalid_key_is_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": { "code": 2006, "message": "API key is invalid." }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client.search("Berlin").await.unwrap_err();

    assert!(matches!(err, ProviderError::Unauthorized(_)));
}

#[tokio::test]
async fn test_server_error_is_retried_then_succeeds() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body("Lima", "Peru")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let snapshot = client.fetch("Lima", 7).await.unwrap();

    assert_eq!(snapshot.location.name, "Lima");
}

#[tokio::test]
async fn test_persistent_server_error_gives_up() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client.fetch("Lima", 7).await.unwrap_err();

    assert!(matches!(err, ProviderError::ServerError { status: 500, .. }));
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"location\": 42}"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client.fetch("Lima", 7).await.unwrap_err();

    assert!(matches!(err, ProviderError::InvalidResponse(_)));
}
