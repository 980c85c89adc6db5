//! Model settings derived from the loaded configuration.

use emocal_calendar::DEFAULT_HORIZON_DAYS;
use emocal_core::{Config, ConfigError, WeatherConfig};
use emocal_weather::{CodeRule, CodeTable, WeatherCategory};

use crate::error_mapping::map_category_error;

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub horizon_days: u32,
    pub default_city: String,
    pub color: bool,
    pub code_table: CodeTable,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            horizon_days: DEFAULT_HORIZON_DAYS,
            default_city: String::new(),
            color: false,
            code_table: CodeTable::default(),
        }
    }
}

impl ModelSettings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            horizon_days: config.forecast.horizon_days,
            default_city: config.calendar.default_city.trim().to_string(),
            color: config.ui.color,
            code_table: code_table_from_config(&config.weather)?,
        })
    }
}

/// The configured table, or the built-in WMO table when none is given.
pub fn code_table_from_config(config: &WeatherConfig) -> Result<CodeTable, ConfigError> {
    if config.code_table.is_empty() {
        return Ok(CodeTable::default());
    }

    let rules = config
        .code_table
        .iter()
        .map(|rule| {
            let category = rule
                .category
                .parse::<WeatherCategory>()
                .map_err(map_category_error)?;
            Ok(CodeRule::new(rule.from, rule.to, category))
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    tracing::info!("Using configured weather code table ({} rules)", rules.len());
    Ok(CodeTable::new(rules))
}
