//! Centralized error types for Nimbus.
//!
//! The weather screen only knows two failure domains: the remote weather
//! provider and the on-device key-value store. Both are typed here so the
//! client, store, and screen crates agree on one taxonomy, and each error can
//! produce a short message suitable for display.

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a UI-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Weather provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Provider(e) => e.user_message(),
            AppError::Store(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
        }
    }
}

/// Failures talking to the remote weather provider (search + forecast).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Provider rejected credentials: {0}")]
    Unauthorized(String),

    #[error("No matching location found: {0}")]
    LocationNotFound(String),

    #[error("Provider error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// Whether retrying the same request may succeed.
    ///
    /// Only transport failures, 5xx/408 statuses and rate limiting qualify.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::ConnectionFailed(_)
            | ProviderError::Timeout
            | ProviderError::RateLimited => true,
            ProviderError::ServerError { status, .. } => *status >= 500 || *status == 408,
            _ => false,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            ProviderError::ConnectionFailed(_) => {
                "Unable to reach the weather service. Check your internet connection."
            }
            ProviderError::Timeout => "The weather service took too long to respond.",
            ProviderError::ServerError { status, .. } if *status >= 500 => {
                "The weather service is having trouble. Please try again later."
            }
            ProviderError::ServerError { .. } => "The weather request failed. Please try again.",
            ProviderError::RateLimited => "Too many requests. Please wait a moment.",
            ProviderError::Unauthorized(_) => "The weather API key is missing or invalid.",
            ProviderError::LocationNotFound(_) => "We couldn't find that city.",
            ProviderError::Api { .. } => "The weather service rejected the request.",
            ProviderError::InvalidResponse(_) => {
                "Received unexpected weather data. Please try again."
            }
            ProviderError::InvalidRequest(_) => "That search can't be sent to the weather service.",
        }
    }
}

/// Key-value persistence failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Read failed: {0}")]
    Read(String),

    #[error("Write failed: {0}")]
    Write(String),
}

impl StoreError {
    pub fn user_message(&self) -> &'static str {
        match self {
            StoreError::Unavailable(_) => "Local storage is unavailable. Try restarting the app.",
            StoreError::Read(_) => "Couldn't read saved settings.",
            StoreError::Write(_) => "Couldn't save your last city.",
        }
    }
}

/// Failures loading or saving `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(String),

    #[error("Failed to write config: {0}")]
    Write(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Read(_) => "Couldn't read the configuration file.",
            ConfigError::Write(_) => "Couldn't write the configuration file.",
            ConfigError::Parse(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_provider_errors_are_retryable() {
        assert!(ProviderError::Timeout.is_retryable());
        assert!(ProviderError::RateLimited.is_retryable());
        assert!(ProviderError::ConnectionFailed("reset".into()).is_retryable());
        assert!(ProviderError::ServerError {
            status: 503,
            message: "down".into()
        }
        .is_retryable());
        assert!(ProviderError::ServerError {
            status: 408,
            message: "slow".into()
        }
        .is_retryable());
    }

    #[test]
    fn permanent_provider_errors_are_not_retryable() {
        assert!(!ProviderError::LocationNotFound("Atlantis".into()).is_retryable());
        assert!(!ProviderError::Unauthorized("bad key".into()).is_retryable());
        assert!(!ProviderError::invalid_request("empty").is_retryable());
        assert!(!ProviderError::ServerError {
            status: 404,
            message: "gone".into()
        }
        .is_retryable());
    }

    #[test]
    fn app_error_delegates_user_message() {
        let err = AppError::from(ProviderError::LocationNotFound("Atlantis".into()));
        assert_eq!(err.user_message(), "We couldn't find that city.");

        let err = AppError::from(StoreError::Write("disk full".into()));
        assert!(err.user_message().contains("last city"));

        let err = AppError::from(ConfigError::Parse("line 1".into()));
        assert!(err.user_message().contains("malformed"));
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn server_error_message_depends_on_status() {
        let outage = ProviderError::ServerError {
            status: 502,
            message: String::new(),
        };
        let rejected = ProviderError::ServerError {
            status: 418,
            message: String::new(),
        };
        assert!(outage.user_message().contains("later"));
        assert_ne!(outage.user_message(), rejected.user_message());
    }
}
