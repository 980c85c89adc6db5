use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Prefix for environment overrides, e.g. `EMOCAL_FORECAST__HORIZON_DAYS=10`.
const ENV_PREFIX: &str = "EMOCAL";

/// Longest horizon the free forecast tier serves (days after today).
const PROVIDER_MAX_HORIZON_DAYS: u32 = 16;

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
#[serde(default)]
pub struct Config {
    /// Forecast and geocoding API endpoints
    pub endpoints: EndpointsConfig,

    /// Geocoding preferences
    pub geocoding: GeocodingConfig,

    /// Forecast window settings
    pub forecast: ForecastConfig,

    /// Calendar view defaults
    pub calendar: CalendarConfig,

    /// Terminal rendering preferences
    pub ui: UiConfig,

    /// Weather-code classification
    pub weather: WeatherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    pub geocoding_url: String,
    pub forecast_url: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            geocoding_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    /// Language for place names returned by the geocoder
    pub language: String,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Days after today covered by the forecast (15 gives a 16-day inclusive span)
    pub horizon_days: u32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self { horizon_days: 15 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// City searched on startup
    pub default_city: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            default_city: "New York".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Dim out-of-month cells with ANSI escapes
    pub color: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

/// One inclusive range of weather codes mapped to a category name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRuleConfig {
    pub from: i32,
    pub to: i32,
    pub category: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Replaces the built-in WMO code table when non-empty
    pub code_table: Vec<CodeRuleConfig>,
}

impl Config {
    /// Load configuration from the default file location, layered under
    /// `EMOCAL_*` environment variables. A missing file yields defaults.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific TOML file plus environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        tracing::debug!("Loading config from {}", path.display());

        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read config sources")?;

        settings
            .try_deserialize()
            .context("Failed to parse config file")
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(
            &self.endpoints.geocoding_url,
            "endpoints.geocoding_url",
            &mut result,
        );
        self.validate_url(
            &self.endpoints.forecast_url,
            "endpoints.forecast_url",
            &mut result,
        );

        if self.forecast.horizon_days > PROVIDER_MAX_HORIZON_DAYS {
            result.add_warning(
                "forecast.horizon_days",
                format!(
                    "Horizon of {} days exceeds the provider's {}-day coverage",
                    self.forecast.horizon_days, PROVIDER_MAX_HORIZON_DAYS
                ),
            );
        }

        if self.geocoding.language.trim().is_empty() {
            result.add_error("geocoding.language", "Language must not be empty");
        }

        if self.calendar.default_city.trim().is_empty() {
            result.add_warning(
                "calendar.default_city",
                "No default city - the calendar starts without a forecast",
            );
        }

        for (i, rule) in self.weather.code_table.iter().enumerate() {
            if rule.from > rule.to {
                result.add_error(
                    format!("weather.code_table[{}]", i),
                    format!("Range start {} is after end {}", rule.from, rule.to),
                );
            }
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

    /// Directory holding `config.toml`
    pub fn config_dir() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Failed to get config directory")?
            .join("emocal"))
    }

    fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}
