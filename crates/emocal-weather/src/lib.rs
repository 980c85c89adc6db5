//! Weather data for emocal
//!
//! Forward geocoding and daily/hourly forecasts via the Open-Meteo APIs,
//! plus the WMO weather-code classifier.

pub mod condition;
pub mod error;
pub mod geocode;
pub mod provider;
pub mod types;

pub use condition::{legend, CodeRule, CodeTable, ParseCategoryError, WeatherCategory};
pub use error::WeatherError;
pub use geocode::Geocoder;
pub use provider::ForecastProvider;
pub use types::*;
