//! Forward geocoding: convert a city name to coordinates.
//! Uses the Open-Meteo geocoding API - free, no API key required.

use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use crate::error::WeatherError;
use crate::provider::handle_response;
use crate::types::Location;

pub const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    /// Absent entirely when nothing matched
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    admin1: Option<String>,
    country_code: Option<String>,
}

impl GeocodingResult {
    /// "Name, Region", falling back to the country code, then the bare name.
    fn label(&self) -> String {
        let region = self
            .admin1
            .as_deref()
            .or(self.country_code.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty());

        match region {
            Some(r) => format!("{}, {}", self.name.trim(), r),
            None => self.name.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Client,
    base_url: String,
    language: String,
}

impl Geocoder {
    pub fn new(base_url: &str, language: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.to_string(),
            language: language.to_string(),
        }
    }

    /// Resolve a free-text place name to its first match.
    #[instrument(skip(self), level = "info")]
    pub async fn search(&self, name: &str) -> Result<Location, WeatherError> {
        let url = Url::parse_with_params(
            &self.base_url,
            &[
                ("name", name),
                ("count", "1"),
                ("language", self.language.as_str()),
                ("format", "json"),
            ],
        )?;
        tracing::debug!("Geocoding request: {}", url);

        let response = self.client.get(url).send().await?;
        let body: GeocodingResponse = handle_response(response).await?;

        let first = body
            .results
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| WeatherError::NotFound(name.to_string()))?;

        let location = Location {
            latitude: first.latitude,
            longitude: first.longitude,
            label: first.label(),
        };
        tracing::info!("Geocoded \"{}\" to {}", name, location.label);
        Ok(location)
    }
}

impl Default for Geocoder {
    fn default() -> Self {
        Self::new(GEOCODING_URL, "en")
    }
}
