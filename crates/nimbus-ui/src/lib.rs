//! Home screen controller for Nimbus.
//!
//! Rendering is left to the caller: [`HomeScreenModel::view`] returns plain
//! formatted strings.

pub mod app_services;
pub mod debounce;
pub mod models;
pub mod screen_state;
pub mod services;
pub mod view;

pub use app_services::AppServices;
pub use debounce::Debouncer;
pub use models::{HomeScreenModel, ScreenEvent, ScreenServices};
pub use screen_state::ViewState;
pub use view::{DayCard, ScreenView, WeatherView};
