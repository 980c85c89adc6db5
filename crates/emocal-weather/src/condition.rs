//! WMO weather-code classification.
//!
//! Codes are mapped through a [`CodeTable`] of inclusive ranges so the
//! boundaries can be revised from configuration when the provider changes
//! its table. Classification is total: unmatched codes are `Unknown`.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Weather condition categories mapped from WMO codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WeatherCategory {
    Clear,
    MostlyClear,
    PartlyCloudy,
    Cloudy,
    Fog,
    LightRainShowers,
    Rain,
    FreezingRain,
    Snow,
    HeavySnow,
    Thunderstorm,
    ThunderstormWithHail,
    #[default]
    Unknown,
}

impl WeatherCategory {
    pub const ALL: [WeatherCategory; 13] = [
        Self::Clear,
        Self::MostlyClear,
        Self::PartlyCloudy,
        Self::Cloudy,
        Self::Fog,
        Self::LightRainShowers,
        Self::Rain,
        Self::FreezingRain,
        Self::Snow,
        Self::HeavySnow,
        Self::Thunderstorm,
        Self::ThunderstormWithHail,
        Self::Unknown,
    ];

    /// Classify with the built-in WMO table.
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: i32) -> Self {
        classify_with(DEFAULT_RULES, code)
    }

    /// Kebab-case name used in configuration files
    pub fn name(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::MostlyClear => "mostly-clear",
            Self::PartlyCloudy => "partly-cloudy",
            Self::Cloudy => "cloudy",
            Self::Fog => "fog",
            Self::LightRainShowers => "light-rain-showers",
            Self::Rain => "rain",
            Self::FreezingRain => "freezing-rain",
            Self::Snow => "snow",
            Self::HeavySnow => "heavy-snow",
            Self::Thunderstorm => "thunderstorm",
            Self::ThunderstormWithHail => "thunderstorm-with-hail",
            Self::Unknown => "unknown",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::MostlyClear => "Mostly clear",
            Self::PartlyCloudy => "Partly cloudy",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Fog",
            Self::LightRainShowers => "Showers",
            Self::Rain => "Rain",
            Self::FreezingRain => "Freezing rain",
            Self::Snow => "Snow",
            Self::HeavySnow => "Heavy snow",
            Self::Thunderstorm => "Storm",
            Self::ThunderstormWithHail => "Storm with hail",
            Self::Unknown => "Unknown",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Clear => "\u{2600}\u{fe0f}",
            Self::MostlyClear => "\u{1f324}\u{fe0f}",
            Self::PartlyCloudy => "\u{26c5}",
            Self::Cloudy => "\u{2601}\u{fe0f}",
            Self::Fog => "\u{1f32b}\u{fe0f}",
            Self::LightRainShowers => "\u{1f326}\u{fe0f}",
            Self::Rain => "\u{1f327}\u{fe0f}",
            Self::FreezingRain => "\u{1f327}\u{fe0f}\u{1f9ca}",
            Self::Snow => "\u{2744}\u{fe0f}",
            Self::HeavySnow => "\u{1f328}\u{fe0f}",
            Self::Thunderstorm => "\u{26c8}\u{fe0f}",
            Self::ThunderstormWithHail => "\u{26c8}\u{fe0f}\u{1f9ca}",
            Self::Unknown => "\u{b7}",
        }
    }
}

/// Categories shown in the legend, in display order.
const LEGEND: [WeatherCategory; 9] = [
    WeatherCategory::Clear,
    WeatherCategory::MostlyClear,
    WeatherCategory::PartlyCloudy,
    WeatherCategory::Cloudy,
    WeatherCategory::Rain,
    WeatherCategory::LightRainShowers,
    WeatherCategory::Thunderstorm,
    WeatherCategory::Snow,
    WeatherCategory::Fog,
];

/// One-line legend, e.g. "☀️ Clear • 🌤️ Mostly clear • ..."
pub fn legend() -> String {
    LEGEND
        .iter()
        .map(|c| format!("{} {}", c.emoji(), c.description()))
        .collect::<Vec<_>>()
        .join(" \u{2022} ")
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown weather category: {0}")]
pub struct ParseCategoryError(pub String);

impl FromStr for WeatherCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

/// Inclusive range of codes mapped to one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRule {
    pub from: i32,
    pub to: i32,
    pub category: WeatherCategory,
}

impl CodeRule {
    pub const fn new(from: i32, to: i32, category: WeatherCategory) -> Self {
        Self { from, to, category }
    }

    pub fn matches(&self, code: i32) -> bool {
        self.from <= code && code <= self.to
    }
}

const DEFAULT_RULES: &[CodeRule] = &[
    CodeRule::new(0, 0, WeatherCategory::Clear),
    CodeRule::new(1, 1, WeatherCategory::MostlyClear),
    CodeRule::new(2, 2, WeatherCategory::PartlyCloudy),
    CodeRule::new(3, 3, WeatherCategory::Cloudy),
    CodeRule::new(45, 45, WeatherCategory::Fog),
    CodeRule::new(48, 48, WeatherCategory::Fog),
    CodeRule::new(51, 57, WeatherCategory::LightRainShowers),
    CodeRule::new(61, 65, WeatherCategory::Rain),
    CodeRule::new(66, 67, WeatherCategory::FreezingRain),
    CodeRule::new(71, 75, WeatherCategory::Snow),
    CodeRule::new(77, 77, WeatherCategory::Snow),
    CodeRule::new(80, 82, WeatherCategory::Rain),
    CodeRule::new(85, 86, WeatherCategory::HeavySnow),
    CodeRule::new(95, 95, WeatherCategory::Thunderstorm),
    CodeRule::new(96, 96, WeatherCategory::ThunderstormWithHail),
    CodeRule::new(99, 99, WeatherCategory::ThunderstormWithHail),
];

fn classify_with(rules: &[CodeRule], code: i32) -> WeatherCategory {
    rules
        .iter()
        .find(|rule| rule.matches(code))
        .map(|rule| rule.category)
        .unwrap_or(WeatherCategory::Unknown)
}

/// Ordered code-to-category rules; the first matching rule wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeTable {
    rules: Vec<CodeRule>,
}

impl Default for CodeTable {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES.to_vec(),
        }
    }
}

impl CodeTable {
    pub fn new(rules: Vec<CodeRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[CodeRule] {
        &self.rules
    }

    pub fn classify(&self, code: i32) -> WeatherCategory {
        classify_with(&self.rules, code)
    }

    /// Classify an optional code; missing codes are `Unknown`.
    pub fn classify_opt(&self, code: Option<i32>) -> WeatherCategory {
        code.map(|c| self.classify(c))
            .unwrap_or(WeatherCategory::Unknown)
    }
}
