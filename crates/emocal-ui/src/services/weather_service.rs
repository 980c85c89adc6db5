//! Weather backend: geocode, daily and hourly calls on the shared runtime.
//! Each call races its cancellation token; results are sent back over the
//! channel tagged with the generation they were issued under.

use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use emocal_calendar::DateRange;
use emocal_core::Config;
use emocal_weather::{
    Coordinates, DailyForecast, ForecastProvider, Geocoder, HourlyForecast, Location,
    WeatherError,
};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;

use crate::query::Ticket;

/// Inputs of the daily query: where, and which dates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyRequest {
    pub at: Coordinates,
    pub range: DateRange,
}

/// Inputs of the hourly query: where, and which single date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlyRequest {
    pub at: Coordinates,
    pub date: NaiveDate,
}

/// Messages sent from async operations back to the model
#[derive(Debug)]
pub enum WeatherServiceMessage {
    GeocodeDone {
        generation: u64,
        result: Result<Location, WeatherError>,
    },
    DailyDone {
        generation: u64,
        result: Result<DailyForecast, WeatherError>,
    },
    HourlyDone {
        generation: u64,
        result: Result<HourlyForecast, WeatherError>,
    },
}

impl WeatherServiceMessage {
    pub fn generation(&self) -> u64 {
        match self {
            Self::GeocodeDone { generation, .. }
            | Self::DailyDone { generation, .. }
            | Self::HourlyDone { generation, .. } => *generation,
        }
    }
}

/// Clients plus the runtime their calls are spawned on.
#[derive(Debug, Clone)]
pub struct WeatherServices {
    geocoder: Arc<Geocoder>,
    provider: Arc<ForecastProvider>,
    runtime: Handle,
}

impl WeatherServices {
    pub fn new(geocoder: Geocoder, provider: ForecastProvider, runtime: Handle) -> Self {
        Self {
            geocoder: Arc::new(geocoder),
            provider: Arc::new(provider),
            runtime,
        }
    }

    pub fn from_config(config: &Config, runtime: Handle) -> Self {
        Self::new(
            Geocoder::new(&config.endpoints.geocoding_url, &config.geocoding.language),
            ForecastProvider::new(&config.endpoints.forecast_url),
            runtime,
        )
    }

    /// Run `call` unless the ticket is cancelled first; a cancelled call
    /// sends nothing.
    fn spawn<I, F>(
        &self,
        tx: &UnboundedSender<WeatherServiceMessage>,
        ticket: Ticket<I>,
        call: F,
        done: fn(u64, F::Output) -> WeatherServiceMessage,
    ) where
        I: Send + 'static,
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let tx = tx.clone();
        let Ticket {
            generation, token, ..
        } = ticket;

        self.runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!(generation, "Call cancelled before completion");
                }
                result = call => {
                    let _ = tx.send(done(generation, result));
                }
            }
        });
    }
}

/// Request geocoding of the ticket's city name.
pub fn request_geocode(
    tx: &UnboundedSender<WeatherServiceMessage>,
    services: &WeatherServices,
    ticket: Ticket<String>,
) {
    let geocoder = services.geocoder.clone();
    let city = ticket.inputs.clone();
    services.spawn(
        tx,
        ticket,
        async move { geocoder.search(&city).await },
        |generation, result| WeatherServiceMessage::GeocodeDone { generation, result },
    );
}

/// Request the daily forecast for the ticket's coordinates and range.
pub fn request_daily(
    tx: &UnboundedSender<WeatherServiceMessage>,
    services: &WeatherServices,
    ticket: Ticket<DailyRequest>,
) {
    let provider = services.provider.clone();
    let DailyRequest { at, range } = ticket.inputs;
    services.spawn(
        tx,
        ticket,
        async move { provider.daily(at, range.start, range.end).await },
        |generation, result| WeatherServiceMessage::DailyDone { generation, result },
    );
}

/// Request the hourly forecast for the ticket's coordinates and date.
pub fn request_hourly(
    tx: &UnboundedSender<WeatherServiceMessage>,
    services: &WeatherServices,
    ticket: Ticket<HourlyRequest>,
) {
    let provider = services.provider.clone();
    let HourlyRequest { at, date } = ticket.inputs;
    services.spawn(
        tx,
        ticket,
        async move { provider.hourly(at, date).await },
        |generation, result| WeatherServiceMessage::HourlyDone { generation, result },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Query;
    use tokio::sync::mpsc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn services(server: &MockServer) -> WeatherServices {
        WeatherServices::new(
            Geocoder::new(&format!("{}/v1/search", server.uri()), "en"),
            ForecastProvider::new(&format!("{}/v1/forecast", server.uri())),
            Handle::current(),
        )
    }

    #[tokio::test]
    async fn test_geocode_result_carries_generation() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{"name": "Oslo", "latitude": 59.91, "longitude": 10.75, "admin1": "Oslo"}]
            })))
            .mount(&mock_server)
            .await;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut query: Query<String, Location> = Query::new("geocode");
        query.trigger(Some("Bergen".to_string()));
        let ticket = query.trigger(Some("Oslo".to_string())).unwrap();
        let generation = ticket.generation;
        assert_eq!(generation, 2);
        request_geocode(&tx, &services(&mock_server), ticket);

        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.generation(), generation);
        assert!(matches!(
            msg,
            WeatherServiceMessage::GeocodeDone { result: Ok(ref location), .. }
                if location.label == "Oslo, Oslo"
        ));
    }

    #[tokio::test]
    async fn test_cancelled_call_sends_nothing() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"results": []}))
                    .set_delay(std::time::Duration::from_millis(200)),
            )
            .mount(&mock_server)
            .await;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut query: Query<String, Location> = Query::new("geocode");
        let ticket = query.trigger(Some("Slowville".to_string())).unwrap();
        request_geocode(&tx, &services(&mock_server), ticket);
        query.trigger(None);
        drop(tx);

        // The only sender left belongs to the cancelled task, which exits silently
        assert!(rx.recv().await.is_none());
    }
}
