use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Icon families the screen has artwork for.
///
/// The provider reports conditions as free text ("Patchy rain possible",
/// "Overcast", ...); several texts share one picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConditionIcon {
    PartlyCloudy,
    #[default]
    ModerateRain,
    Sun,
    Cloud,
    HeavyRain,
    Mist,
}

impl ConditionIcon {
    /// Map a provider condition text to its icon. Unknown texts fall back to
    /// `ModerateRain`, the screen's catch-all picture.
    pub fn from_condition_text(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "partly cloudy" => Self::PartlyCloudy,
            "moderate rain"
            | "patchy rain possible"
            | "patchy rain nearby"
            | "patchy light rain"
            | "light rain"
            | "light rain shower"
            | "moderate rain at times" => Self::ModerateRain,
            "sunny" | "clear" => Self::Sun,
            "overcast" | "cloudy" => Self::Cloud,
            "heavy rain"
            | "heavy rain at times"
            | "moderate or heavy freezing rain"
            | "moderate or heavy rain shower"
            | "moderate or heavy rain with thunder" => Self::HeavyRain,
            "mist" | "fog" | "freezing fog" => Self::Mist,
            _ => Self::ModerateRain,
        }
    }

    /// Asset key used by the renderer
    pub fn key(&self) -> &'static str {
        match self {
            Self::PartlyCloudy => "partlycloudy",
            Self::ModerateRain => "moderaterain",
            Self::Sun => "sun",
            Self::Cloud => "cloud",
            Self::HeavyRain => "heavyrain",
            Self::Mist => "mist",
        }
    }
}

/// Weather condition as reported, plus the icon derived from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    pub icon: ConditionIcon,
}

impl Condition {
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let icon = ConditionIcon::from_condition_text(&text);
        Self { text, icon }
    }
}

/// A place returned by the search endpoint (and echoed by the forecast endpoint)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub region: String,
    pub country: String,
}

impl Location {
    pub fn new(
        name: impl Into<String>,
        region: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            country: country.into(),
        }
    }

    /// "London, United Kingdom"
    pub fn label(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

/// Current conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub humidity: u8,
    pub wind_kph: f64,
    pub condition: Condition,
}

/// One day of the forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub average_temperature_c: f64,
    pub condition: Condition,
    /// `None` when the sun doesn't rise that day (polar regions)
    pub sunrise: Option<NaiveTime>,
}

/// Complete current + forecast payload for one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub current: CurrentConditions,
    pub location: Location,
    pub forecast_days: Vec<ForecastDay>,
}

impl WeatherSnapshot {
    /// Sunrise of the first forecast day, which the screen shows as "today".
    pub fn todays_sunrise(&self) -> Option<NaiveTime> {
        self.forecast_days.first().and_then(|d| d.sunrise)
    }
}
