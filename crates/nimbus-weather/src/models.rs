//! WeatherAPI.com wire format.
//!
//! Only the fields the screen uses are declared; serde ignores the rest.

use chrono::{NaiveDate, NaiveTime};
use nimbus_core::ProviderError;
use serde::Deserialize;

use crate::types::{Condition, CurrentConditions, ForecastDay, Location, WeatherSnapshot};

/// Error code the provider uses for "No matching location found."
pub(crate) const NO_MATCHING_LOCATION: i64 = 1006;

/// Codes for missing, invalid, disabled or over-quota keys.
pub(crate) const KEY_ERRORS: [i64; 5] = [1002, 2006, 2007, 2008, 2009];

#[derive(Debug, Deserialize)]
pub(crate) struct ApiSearchResult {
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
}

impl From<ApiSearchResult> for Location {
    fn from(r: ApiSearchResult) -> Self {
        Location::new(r.name, r.region, r.country)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiForecastResponse {
    pub location: ApiLocation,
    pub current: ApiCurrent,
    pub forecast: ApiForecast,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiLocation {
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCondition {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCurrent {
    pub temp_c: f64,
    pub humidity: u8,
    pub wind_kph: f64,
    pub condition: ApiCondition,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiForecast {
    #[serde(default)]
    pub forecastday: Vec<ApiForecastDay>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiForecastDay {
    pub date: String,
    pub day: ApiDay,
    pub astro: ApiAstro,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiDay {
    pub avgtemp_c: f64,
    pub condition: ApiCondition,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiAstro {
    pub sunrise: String,
}

/// `{"error": {"code": 1006, "message": "No matching location found."}}`
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: i64,
    pub message: String,
}

/// Parse "06:45 AM". Anything else ("No sunrise") means no sunrise that day.
pub(crate) fn parse_sunrise(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%I:%M %p").ok()
}

impl TryFrom<ApiForecastDay> for ForecastDay {
    type Error = ProviderError;

    fn try_from(d: ApiForecastDay) -> Result<Self, Self::Error> {
        let date = NaiveDate::parse_from_str(&d.date, "%Y-%m-%d").map_err(|e| {
            ProviderError::invalid_response(format!("Invalid forecast date {:?}: {e}", d.date))
        })?;

        let sunrise = parse_sunrise(&d.astro.sunrise);
        if sunrise.is_none() {
            tracing::debug!("No sunrise for {}: {:?}", date, d.astro.sunrise);
        }

        Ok(ForecastDay {
            date,
            average_temperature_c: d.day.avgtemp_c,
            condition: Condition::from_text(d.day.condition.text),
            sunrise,
        })
    }
}

impl TryFrom<ApiForecastResponse> for WeatherSnapshot {
    type Error = ProviderError;

    fn try_from(r: ApiForecastResponse) -> Result<Self, Self::Error> {
        let forecast_days = r
            .forecast
            .forecastday
            .into_iter()
            .map(ForecastDay::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(WeatherSnapshot {
            current: CurrentConditions {
                temperature_c: r.current.temp_c,
                humidity: r.current.humidity,
                wind_kph: r.current.wind_kph,
                condition: Condition::from_text(r.current.condition.text),
            },
            location: Location::new(r.location.name, r.location.region, r.location.country),
            forecast_days,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConditionIcon;

    fn sample_forecast() -> serde_json::Value {
        serde_json::json!({
            "location": {
                "name": "Mumbai",
                "region": "Maharashtra",
                "country": "India",
                "lat": 18.98,
                "lon": 72.83
            },
            "current": {
                "temp_c": 31.0,
                "humidity": 62,
                "wind_kph": 14.4,
                "condition": { "text": "Partly cloudy", "icon": "//cdn.weatherapi.com/weather/64x64/day/116.png", "code": 1003 }
            },
            "forecast": {
                "forecastday": [
                    {
                        "date": "2024-05-06",
                        "day": { "avgtemp_c": 29.8, "condition": { "text": "Sunny" } },
                        "astro": { "sunrise": "06:07 AM", "sunset": "07:03 PM" }
                    },
                    {
                        "date": "2024-05-07",
                        "day": { "avgtemp_c": 30.1, "condition": { "text": "Patchy rain possible" } },
                        "astro": { "sunrise": "06:06 AM" }
                    }
                ]
            }
        })
    }

    #[test]
    fn test_snapshot_from_forecast_response() {
        let api: ApiForecastResponse = serde_json::from_value(sample_forecast()).unwrap();
        let snapshot = WeatherSnapshot::try_from(api).unwrap();

        assert_eq!(snapshot.location.name, "Mumbai");
        assert_eq!(snapshot.location.country, "India");
        assert_eq!(snapshot.current.humidity, 62);
        assert!((snapshot.current.wind_kph - 14.4).abs() < f64::EPSILON);
        assert_eq!(snapshot.current.condition.icon, ConditionIcon::PartlyCloudy);

        assert_eq!(snapshot.forecast_days.len(), 2);
        assert_eq!(
            snapshot.forecast_days[0].date,
            NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
        );
        assert_eq!(snapshot.forecast_days[1].condition.icon, ConditionIcon::ModerateRain);
        assert_eq!(snapshot.todays_sunrise(), NaiveTime::from_hms_opt(6, 7, 0));
    }

    #[test]
    fn test_invalid_forecast_date_is_rejected() {
        let mut json = sample_forecast();
        json["forecast"]["forecastday"][0]["date"] = serde_json::json!("06/05/2024");
        let api: ApiForecastResponse = serde_json::from_value(json).unwrap();

        let err = WeatherSnapshot::try_from(api).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[test]
    fn test_parse_sunrise() {
        assert_eq!(parse_sunrise("06:45 AM"), NaiveTime::from_hms_opt(6, 45, 0));
        assert_eq!(parse_sunrise("12:05 PM"), NaiveTime::from_hms_opt(12, 5, 0));
        assert_eq!(parse_sunrise("No sunrise"), None);
    }

    #[test]
    fn test_search_result_ignores_extra_fields() {
        let json = serde_json::json!([
            { "id": 2801268, "name": "London", "region": "City of London, Greater London", "country": "United Kingdom", "lat": 51.52, "lon": -0.11, "url": "london" }
        ]);
        let results: Vec<ApiSearchResult> = serde_json::from_value(json).unwrap();
        let loc = Location::from(results.into_iter().next().unwrap());
        assert_eq!(loc, Location::new("London", "City of London, Greater London", "United Kingdom"));
    }

    #[test]
    fn test_error_envelope() {
        let json = r#"{"error":{"code":1006,"message":"No matching location found."}}"#;
        let env: ApiErrorEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(env.error.code, NO_MATCHING_LOCATION);
        assert_eq!(env.error.message, "No matching location found.");
    }
}
