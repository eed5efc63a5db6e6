use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// Environment variable consulted when `provider.api_key` is not set.
pub const API_KEY_ENV: &str = "NIMBUS_WEATHER_API_KEY";

/// Largest forecast window the provider serves.
pub const MAX_FORECAST_DAYS: u8 = 14;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Weather provider connection settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Home screen behaviour
    #[serde(default)]
    pub screen: ScreenConfig,

    /// Last-city persistence
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the WeatherAPI.com v1 API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key; falls back to `NIMBUS_WEATHER_API_KEY` when absent
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after the first attempt for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff delay; doubles on each retry
    #[serde(default = "default_retry_initial_delay_ms")]
    pub retry_initial_delay_ms: u64,

    /// Backoff ceiling
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

fn default_base_url() -> String {
    "https://api.weatherapi.com/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_initial_delay_ms() -> u64 {
    200
}

fn default_retry_max_delay_ms() -> u64 {
    5000
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_initial_delay_ms: default_retry_initial_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl ProviderConfig {
    /// API key from the config file, or from the environment.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenConfig {
    /// City shown when nothing has been stored yet
    #[serde(default = "default_city")]
    pub default_city: String,

    /// Days requested from the forecast endpoint
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u8,

    /// Quiet period before a typed query is sent
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Queries must be strictly longer than this many characters
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: usize,
}

fn default_city() -> String {
    "Mumbai".to_string()
}

fn default_forecast_days() -> u8 {
    7
}

fn default_search_debounce_ms() -> u64 {
    1200
}

fn default_min_query_chars() -> usize {
    2
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            default_city: default_city(),
            forecast_days: default_forecast_days(),
            search_debounce_ms: default_search_debounce_ms(),
            min_query_chars: default_min_query_chars(),
        }
    }
}

impl ScreenConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file holding the last selected city
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Key the last city is stored under
    #[serde(default = "default_last_city_key")]
    pub last_city_key: String,
}

fn default_last_city_key() -> String {
    "city".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            last_city_key: default_last_city_key(),
        }
    }
}

impl StorageConfig {
    /// Configured database path, or `state.db` in the config directory.
    pub fn effective_database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| config_dir().join("state.db"))
    }
}

/// Nimbus directory under the platform config dir (`.` if unknown).
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nimbus")
}

impl Config {
    /// Load configuration from the default location, creating it if it doesn't exist
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, writing defaults there if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!("Wrote default config to {}", path.display());
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))
    }

    /// Load configuration from the default location and validate it
    pub fn load_validated() -> Result<(Self, ValidationResult), ConfigError> {
        Self::load_validated_from(&Self::config_path())
    }

    /// Load configuration from `path` and validate it
    ///
    /// Returns `ConfigError::Invalid` if validation finds errors; warnings
    /// are logged and returned alongside the config.
    pub fn load_validated_from(path: &Path) -> Result<(Self, ValidationResult), ConfigError> {
        let config = Self::load_from(path)?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.provider.base_url, "provider.base_url", &mut result);

        if self.provider.resolved_api_key().is_none() {
            result.add_warning(
                "provider.api_key",
                format!("No API key configured (set it here or in {API_KEY_ENV})"),
            );
        }

        if self.provider.timeout_secs == 0 {
            result.add_error("provider.timeout_secs", "Timeout must be greater than 0");
        }

        if self.provider.retry_initial_delay_ms > self.provider.retry_max_delay_ms {
            result.add_warning(
                "provider.retry_initial_delay_ms",
                "Initial retry delay exceeds the maximum; every retry will wait the maximum",
            );
        }

        if self.screen.default_city.trim().is_empty() {
            result.add_error("screen.default_city", "Default city must not be empty");
        }

        if self.screen.forecast_days == 0 || self.screen.forecast_days > MAX_FORECAST_DAYS {
            result.add_error(
                "screen.forecast_days",
                format!("Forecast days must be between 1 and {MAX_FORECAST_DAYS}"),
            );
        }

        if self.screen.search_debounce_ms == 0 {
            result.add_warning(
                "screen.search_debounce_ms",
                "Search debounce disabled; every keystroke hits the provider",
            );
        }

        if self.storage.last_city_key.trim().is_empty() {
            result.add_error("storage.last_city_key", "Storage key must not be empty");
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Write(format!("{}: {}", parent.display(), e)))?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Write(e.to_string()))?;

        std::fs::write(path, contents)
            .map_err(|e| ConfigError::Write(format!("{}: {}", path.display(), e)))
    }

    /// Get the path to the configuration file
    pub fn config_path() -> PathBuf {
        config_dir().join("config.toml")
    }
}
