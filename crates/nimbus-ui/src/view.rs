//! Display strings for the home screen.

use nimbus_core::ProviderError;
use nimbus_weather::{ForecastDay, Location, WeatherSnapshot};

use crate::screen_state::ViewState;

/// Shown when the provider reports no sunrise for today.
pub const NO_SUNRISE: &str = "--";

/// Header plus forecast cards for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherView {
    /// "London, United Kingdom"
    pub title: String,
    pub temperature: String,
    pub condition: String,
    pub icon: &'static str,
    pub wind: String,
    pub humidity: String,
    pub sunrise: String,
    pub days: Vec<DayCard>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCard {
    /// Full weekday name, e.g. "Monday"
    pub day_name: String,
    pub temperature: String,
    pub condition: String,
    pub icon: &'static str,
}

impl WeatherView {
    pub fn from_snapshot(snapshot: &WeatherSnapshot) -> Self {
        let current = &snapshot.current;
        Self {
            title: snapshot.location.label(),
            temperature: format_temperature(current.temperature_c),
            condition: current.condition.text.clone(),
            icon: current.condition.icon.key(),
            wind: format!("{}km", current.wind_kph),
            humidity: format!("{}%", current.humidity),
            sunrise: snapshot
                .todays_sunrise()
                .map(|t| t.format("%I:%M %p").to_string())
                .unwrap_or_else(|| NO_SUNRISE.to_string()),
            days: snapshot.forecast_days.iter().map(DayCard::from_day).collect(),
        }
    }
}

impl DayCard {
    pub fn from_day(day: &ForecastDay) -> Self {
        Self {
            day_name: day.date.format("%A").to_string(),
            temperature: format_temperature(day.average_temperature_c),
            condition: day.condition.text.clone(),
            icon: day.condition.icon.key(),
        }
    }
}

/// "31°" for whole degrees, "29.8°" otherwise.
pub fn format_temperature(celsius: f64) -> String {
    format!("{}°", celsius)
}

/// Full screen, ready to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenView {
    pub loading: bool,
    /// The weather shown is from an earlier request that has since failed
    pub stale: bool,
    pub error_message: Option<String>,
    pub search_open: bool,
    pub query: String,
    /// Candidate rows, "name, country"
    pub candidates: Vec<String>,
    pub search_error: Option<String>,
    pub weather: Option<WeatherView>,
}

impl ScreenView {
    pub fn build(
        state: &ViewState,
        snapshot: Option<&WeatherSnapshot>,
        search_open: bool,
        query: &str,
        candidates: &[Location],
        search_error: Option<&ProviderError>,
    ) -> Self {
        Self {
            loading: state.is_loading(),
            stale: state.can_retry() && snapshot.is_some(),
            error_message: state.error().map(|e| e.user_message().to_string()),
            search_open,
            query: query.to_string(),
            candidates: candidates.iter().map(Location::label).collect(),
            search_error: search_error.map(|e| e.user_message().to_string()),
            weather: snapshot.map(WeatherView::from_snapshot),
        }
    }
}

impl std::fmt::Display for ScreenView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.loading {
            writeln!(f, "Loading...")?;
        }
        if let Some(message) = &self.error_message {
            writeln!(f, "Error: {}", message)?;
        }
        if let Some(weather) = &self.weather {
            if self.stale {
                writeln!(f, "(showing earlier data)")?;
            }
            writeln!(f, "{}", weather.title)?;
            writeln!(
                f,
                "{}  {} [{}]",
                weather.temperature, weather.condition, weather.icon
            )?;
            writeln!(
                f,
                "Wind {}  Humidity {}  Sunrise {}",
                weather.wind, weather.humidity, weather.sunrise
            )?;
            for day in &weather.days {
                writeln!(f, "  {:<10} {:>6}  [{}]", day.day_name, day.temperature, day.icon)?;
            }
        }
        if self.search_open {
            writeln!(f, "Search: {}", self.query)?;
            for (i, candidate) in self.candidates.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, candidate)?;
            }
            if let Some(message) = &self.search_error {
                writeln!(f, "  ({})", message)?;
            }
        }
        Ok(())
    }
}
