use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Latitude/longitude pair, compared by value when deciding whether a
/// forecast request's inputs changed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Geographic location resolved from a city name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// Display label, e.g. "Paris, Île-de-France"
    pub label: String,
}

impl Location {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Daily forecast entry. Values are stored as reported (°C, mm);
/// rounding and unit conversion happen only when rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastEntry {
    pub date: NaiveDate,
    pub weather_code: Option<i32>,
    pub temperature_max: Option<f64>,
    pub temperature_min: Option<f64>,
    pub precipitation_mm: Option<f64>,
}

/// Date-keyed daily entries for one location and request window.
/// Dates without an entry have no data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    entries: BTreeMap<NaiveDate, DailyForecastEntry>,
}

impl DailyForecast {
    pub fn get(&self, date: NaiveDate) -> Option<&DailyForecastEntry> {
        self.entries.get(&date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.entries.contains_key(&date)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending date order
    pub fn iter(&self) -> impl Iterator<Item = &DailyForecastEntry> {
        self.entries.values()
    }
}

impl FromIterator<DailyForecastEntry> for DailyForecast {
    fn from_iter<T: IntoIterator<Item = DailyForecastEntry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|e| (e.date, e)).collect(),
        }
    }
}

/// Hourly forecast entry (local time of the forecast location)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecastEntry {
    pub time: NaiveDateTime,
    pub weather_code: Option<i32>,
    pub temperature: Option<f64>,
    pub precipitation_probability: Option<u8>,
    pub wind_speed: Option<f64>,
}

/// Ordered hourly entries for exactly one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    pub date: NaiveDate,
    pub hours: Vec<HourlyForecastEntry>,
}

impl HourlyForecast {
    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }
}
