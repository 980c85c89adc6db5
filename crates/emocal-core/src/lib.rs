pub mod app;
pub mod config;
pub mod error;

pub use app::App;
pub use config::{
    CalendarConfig, CodeRuleConfig, Config, EndpointsConfig, ForecastConfig, GeocodingConfig,
    UiConfig, ValidationResult, WeatherConfig,
};
pub use error::{AppError, ConfigError, ForecastError, NetworkError, ReqwestErrorExt};

use anyhow::Result;

/// Initialize logging. Output goes to stderr so it never interleaves with
/// the rendered calendar on stdout.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("emocal core initialized");
    Ok(())
}
