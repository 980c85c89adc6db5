//! Open-Meteo forecast client: daily ranges and single-day hourly detail.

use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use crate::error::WeatherError;
use crate::types::{
    Coordinates, DailyForecast, DailyForecastEntry, HourlyForecast, HourlyForecastEntry,
};

pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

const DAILY_FIELDS: &str = "weathercode,temperature_2m_max,temperature_2m_min,precipitation_sum";
const HOURLY_FIELDS: &str = "weathercode,temperature_2m,precipitation_probability,wind_speed_10m";
const HOURLY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Deserialize)]
struct DailyResponse {
    daily: Option<DailyBlock>,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    time: Option<Vec<NaiveDate>>,
    #[serde(default, alias = "weather_code")]
    weathercode: Vec<Option<i32>>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct HourlyResponse {
    hourly: Option<HourlyBlock>,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    time: Option<Vec<String>>,
    #[serde(default, alias = "weather_code")]
    weathercode: Vec<Option<i32>>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability: Vec<Option<u8>>,
    #[serde(default)]
    wind_speed_10m: Vec<Option<f64>>,
}

/// Error body returned with non-success statuses
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    reason: String,
}

/// Value at `i`, treating short arrays like explicit nulls.
fn at<T: Copy>(values: &[Option<T>], i: usize) -> Option<T> {
    values.get(i).copied().flatten()
}

fn ymd(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Shared response handling: non-success statuses become `Server` errors
/// carrying the provider's `reason` when present.
pub(crate) async fn handle_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, WeatherError> {
    let status = response.status();

    if status.is_success() {
        response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(format!("JSON parse error: {}", e)))
    } else {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .map(|body| body.reason)
            .unwrap_or(text);
        Err(WeatherError::Server {
            status: status.as_u16(),
            message,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ForecastProvider {
    client: Client,
    base_url: String,
}

impl ForecastProvider {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.to_string(),
        }
    }

    /// Daily forecast for every date in `[start, end]`, in the location's
    /// own timezone.
    #[instrument(skip(self), level = "info")]
    pub async fn daily(
        &self,
        at_coords: Coordinates,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DailyForecast, WeatherError> {
        if start > end {
            return Err(WeatherError::EmptyResult(format!(
                "empty range {} to {}",
                ymd(start),
                ymd(end)
            )));
        }

        let url = Url::parse_with_params(
            &self.base_url,
            &[
                ("latitude", at_coords.latitude.to_string()),
                ("longitude", at_coords.longitude.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("timezone", "auto".to_string()),
                ("start_date", ymd(start)),
                ("end_date", ymd(end)),
            ],
        )?;
        tracing::debug!("Daily forecast request: {}", url);

        let response = self.client.get(url).send().await?;
        let body: DailyResponse = handle_response(response).await?;

        let block = body
            .daily
            .ok_or_else(|| WeatherError::EmptyResult("response has no daily block".into()))?;
        let times = block
            .time
            .filter(|t| !t.is_empty())
            .ok_or_else(|| WeatherError::EmptyResult("daily block has no dates".into()))?;

        let forecast: DailyForecast = times
            .into_iter()
            .enumerate()
            .map(|(i, date)| DailyForecastEntry {
                date,
                weather_code: at(&block.weathercode, i),
                temperature_max: at(&block.temperature_2m_max, i),
                temperature_min: at(&block.temperature_2m_min, i),
                precipitation_mm: at(&block.precipitation_sum, i),
            })
            .collect();

        tracing::info!("Fetched {} daily entries", forecast.len());
        Ok(forecast)
    }

    /// Hourly forecast for a single local date.
    #[instrument(skip(self), level = "info")]
    pub async fn hourly(
        &self,
        at_coords: Coordinates,
        date: NaiveDate,
    ) -> Result<HourlyForecast, WeatherError> {
        let day = ymd(date);
        let url = Url::parse_with_params(
            &self.base_url,
            &[
                ("latitude", at_coords.latitude.to_string()),
                ("longitude", at_coords.longitude.to_string()),
                ("timezone", "auto".to_string()),
                ("start_date", day.clone()),
                ("end_date", day),
                ("hourly", HOURLY_FIELDS.to_string()),
            ],
        )?;
        tracing::debug!("Hourly forecast request: {}", url);

        let response = self.client.get(url).send().await?;
        let body: HourlyResponse = handle_response(response).await?;

        let block = body
            .hourly
            .ok_or_else(|| WeatherError::EmptyResult("response has no hourly block".into()))?;
        let times = block
            .time
            .filter(|t| !t.is_empty())
            .ok_or_else(|| WeatherError::EmptyResult("hourly block has no timestamps".into()))?;

        let hours = times
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let time = NaiveDateTime::parse_from_str(t, HOURLY_TIME_FORMAT)
                    .map_err(|e| WeatherError::Parse(format!("bad timestamp {:?}: {}", t, e)))?;
                Ok(HourlyForecastEntry {
                    time,
                    weather_code: at(&block.weathercode, i),
                    temperature: at(&block.temperature_2m, i),
                    precipitation_probability: at(&block.precipitation_probability, i),
                    wind_speed: at(&block.wind_speed_10m, i),
                })
            })
            .collect::<Result<Vec<_>, WeatherError>>()?;

        tracing::info!("Fetched {} hourly entries for {}", hours.len(), date);
        Ok(HourlyForecast { date, hours })
    }
}

impl Default for ForecastProvider {
    fn default() -> Self {
        Self::new(FORECAST_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const NYC: Coordinates = Coordinates {
        latitude: 40.71427,
        longitude: -74.00597,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn provider(server: &MockServer) -> ForecastProvider {
        ForecastProvider::new(&format!("{}/v1/forecast", server.uri()))
    }

    #[tokio::test]
    async fn test_daily_maps_entries_by_date() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "40.71427"))
            .and(query_param("longitude", "-74.00597"))
            .and(query_param("daily", DAILY_FIELDS))
            .and(query_param("timezone", "auto"))
            .and(query_param("start_date", "2026-10-16"))
            .and(query_param("end_date", "2026-10-18"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "latitude": 40.71,
                "longitude": -74.0,
                "daily": {
                    "time": ["2026-10-16", "2026-10-17", "2026-10-18"],
                    "weathercode": [0, 61, null],
                    "temperature_2m_max": [21.4, 18.5, 17.0],
                    "temperature_2m_min": [12.1, 11.0, 9.6],
                    "precipitation_sum": [0.0, 12.7, null]
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let forecast = provider(&mock_server)
            .daily(NYC, date(2026, 10, 16), date(2026, 10, 18))
            .await
            .unwrap();

        assert_eq!(forecast.len(), 3);
        let rainy = forecast.get(date(2026, 10, 17)).unwrap();
        assert_eq!(rainy.weather_code, Some(61));
        assert_eq!(rainy.precipitation_mm, Some(12.7));
        assert_eq!(rainy.temperature_max, Some(18.5));
        let last = forecast.get(date(2026, 10, 18)).unwrap();
        assert_eq!(last.weather_code, None);
        assert_eq!(last.precipitation_mm, None);
    }

    #[tokio::test]
    async fn test_daily_missing_block_is_empty_result() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"latitude": 40.7})),
            )
            .mount(&mock_server)
            .await;

        let result = provider(&mock_server)
            .daily(NYC, date(2026, 10, 16), date(2026, 10, 18))
            .await;
        assert!(matches!(result, Err(WeatherError::EmptyResult(_))));
    }

    #[tokio::test]
    async fn test_daily_out_of_range_reports_reason() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": true,
                "reason": "Parameter 'start_date' is out of allowed range"
            })))
            .mount(&mock_server)
            .await;

        let result = provider(&mock_server)
            .daily(NYC, date(2027, 1, 1), date(2027, 1, 31))
            .await;
        assert!(matches!(
            result,
            Err(WeatherError::Server { status: 400, ref message })
                if message.contains("out of allowed range")
        ));
    }

    #[tokio::test]
    async fn test_daily_inverted_range_skips_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let result = provider(&mock_server)
            .daily(NYC, date(2026, 10, 20), date(2026, 10, 16))
            .await;
        assert!(matches!(result, Err(WeatherError::EmptyResult(_))));
    }

    #[tokio::test]
    async fn test_daily_malformed_body_is_parse_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let result = provider(&mock_server)
            .daily(NYC, date(2026, 10, 16), date(2026, 10, 16))
            .await;
        assert!(matches!(result, Err(WeatherError::Parse(_))));
    }

    #[tokio::test]
    async fn test_hourly_for_single_date() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("start_date", "2026-10-17"))
            .and(query_param("end_date", "2026-10-17"))
            .and(query_param("hourly", HOURLY_FIELDS))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "hourly": {
                    "time": ["2026-10-17T00:00", "2026-10-17T01:00", "2026-10-17T13:00"],
                    "weathercode": [3, 61, 95],
                    "temperature_2m": [11.2, 10.8, 17.5],
                    "precipitation_probability": [5, 60, null],
                    "wind_speed_10m": [8.4, 9.1]
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let forecast = provider(&mock_server)
            .hourly(NYC, date(2026, 10, 17))
            .await
            .unwrap();

        assert_eq!(forecast.date, date(2026, 10, 17));
        assert_eq!(forecast.hours.len(), 3);
        assert_eq!(forecast.hours[1].precipitation_probability, Some(60));
        assert_eq!(forecast.hours[2].time.hour(), 13);
        assert_eq!(forecast.hours[2].precipitation_probability, None);
        assert_eq!(forecast.hours[2].wind_speed, None);
    }

    #[tokio::test]
    async fn test_hourly_empty_times_is_empty_result() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "hourly": {"time": []}
            })))
            .mount(&mock_server)
            .await;

        let result = provider(&mock_server).hourly(NYC, date(2026, 10, 17)).await;
        assert!(matches!(result, Err(WeatherError::EmptyResult(_))));
    }

    #[tokio::test]
    async fn test_hourly_bad_timestamp_is_parse_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "hourly": {"time": ["yesterday"]}
            })))
            .mount(&mock_server)
            .await;

        let result = provider(&mock_server).hourly(NYC, date(2026, 10, 17)).await;
        assert!(matches!(result, Err(WeatherError::Parse(_))));
    }
}
