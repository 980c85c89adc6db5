//! Maps service errors to emocal_core::AppError for consistent user-facing messages.

mod config;
mod weather;

pub use config::map_category_error;
pub use weather::map_weather_error;
