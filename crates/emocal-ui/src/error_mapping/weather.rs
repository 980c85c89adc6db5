use emocal_core::{AppError, ConfigError, ForecastError, NetworkError, ReqwestErrorExt};
use emocal_weather::WeatherError;

/// Convert a weather client error into the application hierarchy so the
/// hint line can use its user message.
pub fn map_weather_error(e: WeatherError) -> AppError {
    match e {
        WeatherError::NotFound(name) => AppError::Forecast(ForecastError::LocationNotFound(name)),
        WeatherError::EmptyResult(s) => AppError::Forecast(ForecastError::NoData(s)),
        WeatherError::Network(err) => AppError::Network(err.into_network_error()),
        WeatherError::Server { status, message } => {
            AppError::Network(NetworkError::ServerError { status, message })
        }
        WeatherError::Parse(s) => AppError::Network(NetworkError::InvalidResponse(s)),
        WeatherError::InvalidUrl(err) => AppError::Config(ConfigError::Invalid(err.to_string())),
    }
}
