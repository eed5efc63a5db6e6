pub mod home_model;

pub use home_model::{HomeScreenModel, ScreenEvent, ScreenServices};
