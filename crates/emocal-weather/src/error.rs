//! Weather-specific error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeatherError {
    /// The geocoder had no match for the searched name.
    #[error("No location found for \"{0}\"")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },

    /// The call succeeded but carried nothing usable.
    #[error("Empty result: {0}")]
    EmptyResult(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl WeatherError {
    /// True for "no data" answers, as opposed to failures.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::EmptyResult(_))
    }
}
