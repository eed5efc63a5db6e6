//! Forecast state machine for the home screen.
//!
//! Search state is tracked separately by the controller; this only covers
//! the forecast area.

use nimbus_core::ProviderError;

/// What the forecast area is showing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    /// A fetch is outstanding
    #[default]
    Loading,
    /// The latest fetch succeeded
    Ready,
    /// The latest fetch failed; any earlier snapshot is stale
    Failed { error: ProviderError },
}

impl ViewState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ViewState::Ready)
    }

    pub fn error(&self) -> Option<&ProviderError> {
        match self {
            ViewState::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// True if `retry` has something to recover from.
    pub fn can_retry(&self) -> bool {
        matches!(self, ViewState::Failed { .. })
    }

    /// State after issuing a fetch.
    pub fn on_fetch_started(self) -> Self {
        ViewState::Loading
    }

    /// State after applying a successful ForecastDone message.
    pub fn on_fetch_succeeded(self) -> Self {
        ViewState::Ready
    }

    /// State after applying a failed ForecastDone message.
    pub fn on_fetch_failed(self, error: ProviderError) -> Self {
        ViewState::Failed { error }
    }
}
