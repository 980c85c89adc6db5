//! Calendar model: owns the view state and the three weather queries.
//!
//! Inputs flow one way. The committed city feeds geocoding, the resolved
//! location plus the request window feeds the daily query, and the location
//! plus the selected date feeds the hourly query. Every mutation ends with
//! `sync`, which recomputes those inputs and issues whatever calls changed.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use emocal_calendar::{CalendarError, DateRange, ViewState, YearMonth};
use emocal_weather::{
    DailyForecast, DailyForecastEntry, HourlyForecast, Location, WeatherCategory,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::format::ymd;
use crate::query::{Outcome, Query, QueryStatus};
use crate::services::{
    request_daily, request_geocode, request_hourly, DailyRequest, HourlyRequest,
    WeatherServiceMessage, WeatherServices,
};
use crate::settings::ModelSettings;

const NO_FORECAST_REASON: &str = "No forecast available for this month";

/// One grid cell joined with its daily forecast, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
    pub is_selected: bool,
    pub entry: Option<DailyForecastEntry>,
    pub category: WeatherCategory,
}

impl DayCell {
    pub fn has_data(&self) -> bool {
        self.entry.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourRow {
    pub time: NaiveDateTime,
    pub category: WeatherCategory,
    pub temperature: Option<f64>,
    pub precipitation_probability: Option<u8>,
    pub wind_speed: Option<f64>,
}

/// Detail for the selected day.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySheet {
    pub date: NaiveDate,
    pub city: String,
    pub entry: Option<DailyForecastEntry>,
    pub category: WeatherCategory,
    pub status: QueryStatus,
    pub message: Option<String>,
    pub hours: Vec<HourRow>,
}

/// Non-blocking status lines shown above the grid.
#[derive(Debug, Clone, PartialEq)]
pub enum Hint {
    FindingCity,
    CityNotFound,
    GeocodeFailed(String),
    LoadingForecast,
    NoForecast,
    ForecastFailed(String),
    Location {
        label: String,
        window: Option<DateRange>,
    },
    LoadingHours,
    NoHours,
    HoursFailed(String),
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FindingCity => f.write_str("Finding city\u{2026}"),
            Self::CityNotFound => f.write_str("City not found. Try another name."),
            Self::GeocodeFailed(msg) => write!(f, "Could not look up city: {}", msg),
            Self::LoadingForecast => f.write_str("Loading forecast\u{2026}"),
            Self::NoForecast => f.write_str("No forecast available for this month."),
            Self::ForecastFailed(msg) => write!(f, "Could not load forecast: {}", msg),
            Self::Location {
                label,
                window: Some(window),
            } => write!(f, "{} \u{b7} forecast {}", label, window),
            Self::Location {
                label,
                window: None,
            } => f.write_str(label),
            Self::LoadingHours => f.write_str("Loading hourly forecast\u{2026}"),
            Self::NoHours => f.write_str("No hourly data for this day."),
            Self::HoursFailed(msg) => write!(f, "Could not load hourly forecast: {}", msg),
        }
    }
}

pub struct CalendarModel {
    view: ViewState,
    city_input: String,
    today: NaiveDate,
    settings: ModelSettings,
    geocode: Query<String, Location>,
    daily: Query<DailyRequest, DailyForecast>,
    hourly: Query<HourlyRequest, HourlyForecast>,
    services: WeatherServices,
    tx: UnboundedSender<WeatherServiceMessage>,
    rx: UnboundedReceiver<WeatherServiceMessage>,
}

impl CalendarModel {
    pub fn new(
        view: ViewState,
        today: NaiveDate,
        settings: ModelSettings,
        services: WeatherServices,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut model = Self {
            city_input: view.city.clone().unwrap_or_default(),
            view,
            today,
            settings,
            geocode: Query::new("geocode"),
            daily: Query::new("daily"),
            hourly: Query::new("hourly"),
            services,
            tx,
            rx,
        };
        model.sync();
        model
    }

    // ---- Mutations ----

    /// Update the text being typed. Nothing is fetched until `search`.
    pub fn set_city_input(&mut self, text: &str) {
        self.city_input = text.to_string();
    }

    /// Commit the typed text as the city.
    pub fn search(&mut self) {
        self.view.commit_city(&self.city_input);
        tracing::info!("Searching for city {:?}", self.view.city);
        self.sync();
    }

    pub fn search_city(&mut self, name: &str) {
        self.set_city_input(name);
        self.search();
    }

    pub fn change_month(&mut self, delta: i32) -> Result<(), CalendarError> {
        self.view.shift_month(delta)?;
        self.sync();
        Ok(())
    }

    pub fn go_to_today(&mut self) -> Result<(), CalendarError> {
        self.view.month = YearMonth::containing(self.today)?;
        self.sync();
        Ok(())
    }

    /// Move "today", e.g. across midnight.
    pub fn set_today(&mut self, today: NaiveDate) {
        if self.today != today {
            self.today = today;
            self.sync();
        }
    }

    /// Open the day sheet. Only days with daily data can be opened.
    pub fn select_date(&mut self, date: NaiveDate) -> bool {
        let has_data = self
            .daily
            .data()
            .map(|forecast| forecast.contains(date))
            .unwrap_or(false);
        if !has_data {
            tracing::debug!("No daily data for {}, not opening", ymd(date));
            return false;
        }

        self.view.selected = Some(date);
        self.sync();
        true
    }

    pub fn close_day(&mut self) {
        if self.view.selected.take().is_some() {
            self.sync();
        }
    }

    /// Forget every result and fetch again from the current view.
    pub fn refresh(&mut self) {
        tracing::info!("Refreshing all queries");
        self.geocode.invalidate();
        self.daily.invalidate();
        self.hourly.invalidate();
        self.sync();
    }

    // ---- Completions ----

    /// Apply every completion already delivered. Returns true if any of
    /// them changed state.
    pub fn poll_channel(&mut self) -> bool {
        let mut changed = false;
        while let Ok(msg) = self.rx.try_recv() {
            changed |= self.apply(msg);
        }
        changed
    }

    /// Wait for the next completion. The model keeps a sender alive, so this
    /// only returns `None` if the channel is closed externally.
    pub async fn next_message(&mut self) -> Option<WeatherServiceMessage> {
        self.rx.recv().await
    }

    /// Apply one completion. Stale completions change nothing and return false.
    pub fn apply(&mut self, msg: WeatherServiceMessage) -> bool {
        let applied = match msg {
            WeatherServiceMessage::GeocodeDone { generation, result } => {
                if let Err(e) = &result {
                    tracing::warn!("Geocoding failed: {}", e);
                }
                self.geocode.complete(generation, Outcome::from(result))
            }
            WeatherServiceMessage::DailyDone { generation, result } => {
                if let Err(e) = &result {
                    tracing::warn!("Daily forecast failed: {}", e);
                }
                self.daily.complete(generation, Outcome::from(result))
            }
            WeatherServiceMessage::HourlyDone { generation, result } => {
                if let Err(e) = &result {
                    tracing::warn!("Hourly forecast failed: {}", e);
                }
                self.hourly.complete(generation, Outcome::from(result))
            }
        };

        if applied {
            self.sync();
        }
        applied
    }

    /// Apply completions until no query is loading.
    pub async fn settle(&mut self) {
        while self.is_loading() {
            match self.rx.recv().await {
                Some(msg) => {
                    self.apply(msg);
                }
                None => break,
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.geocode.is_loading() || self.daily.is_loading() || self.hourly.is_loading()
    }

    // ---- Dependency cascade ----

    fn sync(&mut self) {
        if let Some(ticket) = self.geocode.trigger(self.view.city.clone()) {
            request_geocode(&self.tx, &self.services, ticket);
        }

        let at = self.location().map(Location::coordinates);

        match at {
            Some(at) => {
                let range = self.request_window();
                let request = DailyRequest { at, range };
                if range.is_empty() {
                    self.daily.skip(request, NO_FORECAST_REASON);
                } else if let Some(ticket) = self.daily.trigger(Some(request)) {
                    request_daily(&self.tx, &self.services, ticket);
                }
            }
            None => {
                self.daily.trigger(None);
            }
        }

        let hourly_inputs = at
            .zip(self.view.selected)
            .map(|(at, date)| HourlyRequest { at, date });
        if let Some(ticket) = self.hourly.trigger(hourly_inputs) {
            request_hourly(&self.tx, &self.services, ticket);
        }
    }

    // ---- Derived views ----

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    pub fn location(&self) -> Option<&Location> {
        self.geocode.data()
    }

    pub fn geocode_status(&self) -> QueryStatus {
        self.geocode.status()
    }

    pub fn daily_status(&self) -> QueryStatus {
        self.daily.status()
    }

    pub fn hourly_status(&self) -> QueryStatus {
        self.hourly.status()
    }

    pub fn daily_forecast(&self) -> Option<&DailyForecast> {
        self.daily.data()
    }

    pub fn request_window(&self) -> DateRange {
        self.view
            .request_window(self.today, self.settings.horizon_days)
    }

    pub fn cells(&self) -> Vec<DayCell> {
        let forecast = self.daily.data();
        self.view
            .grid()
            .into_iter()
            .map(|cell| {
                let entry = forecast.and_then(|f| f.get(cell.date)).cloned();
                let category = self.category_of(entry.as_ref());
                DayCell {
                    date: cell.date,
                    in_month: cell.in_month,
                    is_today: cell.date == self.today,
                    is_selected: self.view.selected == Some(cell.date),
                    entry,
                    category,
                }
            })
            .collect()
    }

    pub fn hints(&self) -> Vec<Hint> {
        let mut hints = Vec::new();

        match self.geocode.status() {
            QueryStatus::Idle => return hints,
            QueryStatus::Loading => {
                hints.push(Hint::FindingCity);
                return hints;
            }
            QueryStatus::Empty => {
                hints.push(Hint::CityNotFound);
                return hints;
            }
            QueryStatus::Error => {
                hints.push(Hint::GeocodeFailed(self.message_of(self.geocode.message())));
                return hints;
            }
            QueryStatus::Ready => {}
        }

        if let Some(location) = self.location() {
            let window = self.request_window();
            hints.push(Hint::Location {
                label: location.label.clone(),
                window: (!window.is_empty()).then_some(window),
            });
        }

        match self.daily.status() {
            QueryStatus::Loading => hints.push(Hint::LoadingForecast),
            QueryStatus::Empty => hints.push(Hint::NoForecast),
            QueryStatus::Error => {
                hints.push(Hint::ForecastFailed(self.message_of(self.daily.message())))
            }
            QueryStatus::Idle | QueryStatus::Ready => {}
        }

        match self.hourly.status() {
            QueryStatus::Loading => hints.push(Hint::LoadingHours),
            QueryStatus::Empty => hints.push(Hint::NoHours),
            QueryStatus::Error => {
                hints.push(Hint::HoursFailed(self.message_of(self.hourly.message())))
            }
            QueryStatus::Idle | QueryStatus::Ready => {}
        }

        hints
    }

    /// Detail for the selected day. Hidden while no location is resolved;
    /// the selection itself is kept and the sheet returns with the city.
    pub fn day_sheet(&self) -> Option<DaySheet> {
        let date = self.view.selected?;
        let location = self.location()?;
        let entry = self.daily.data().and_then(|f| f.get(date)).cloned();
        let category = self.category_of(entry.as_ref());
        let table = &self.settings.code_table;

        let hours = self
            .hourly
            .data()
            .map(|forecast| {
                forecast
                    .hours
                    .iter()
                    .map(|hour| HourRow {
                        time: hour.time,
                        category: table.classify_opt(hour.weather_code),
                        temperature: hour.temperature,
                        precipitation_probability: hour.precipitation_probability,
                        wind_speed: hour.wind_speed,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(DaySheet {
            date,
            city: location.label.clone(),
            entry,
            category,
            status: self.hourly.status(),
            message: self.hourly.message().map(str::to_string),
            hours,
        })
    }

    fn category_of(&self, entry: Option<&DailyForecastEntry>) -> WeatherCategory {
        self.settings
            .code_table
            .classify_opt(entry.and_then(|e| e.weather_code))
    }

    fn message_of(&self, message: Option<&str>) -> String {
        message.unwrap_or("unknown error").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emocal_weather::{ForecastProvider, Geocoder};
    use tokio::runtime::Handle;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // Unroutable endpoints: these tests never await a completion.
    fn offline_services() -> WeatherServices {
        WeatherServices::new(
            Geocoder::new("http://127.0.0.1:9/v1/search", "en"),
            ForecastProvider::new("http://127.0.0.1:9/v1/forecast"),
            Handle::current(),
        )
    }

    fn model(today: NaiveDate) -> CalendarModel {
        CalendarModel::new(
            ViewState::for_today(today).unwrap(),
            today,
            ModelSettings::default(),
            offline_services(),
        )
    }

    #[tokio::test]
    async fn test_no_city_stays_idle() {
        let model = model(date(2026, 10, 16));
        assert_eq!(model.geocode_status(), QueryStatus::Idle);
        assert_eq!(model.daily_status(), QueryStatus::Idle);
        assert!(!model.is_loading());
        assert!(model.hints().is_empty());
    }

    #[tokio::test]
    async fn test_typing_does_not_search() {
        let mut model = model(date(2026, 10, 16));
        model.set_city_input("Lisb");
        assert_eq!(model.geocode_status(), QueryStatus::Idle);
        assert_eq!(model.view().city, None);

        model.search();
        assert_eq!(model.geocode_status(), QueryStatus::Loading);
        assert_eq!(model.hints(), vec![Hint::FindingCity]);
    }

    #[tokio::test]
    async fn test_geocode_result_starts_daily_query() {
        let mut model = model(date(2026, 10, 16));
        model.search_city("Lisbon");
        let generation = model.geocode.generation();

        let applied = model.apply(WeatherServiceMessage::GeocodeDone {
            generation,
            result: Ok(Location {
                latitude: 38.72,
                longitude: -9.14,
                label: "Lisbon, Lisbon".into(),
            }),
        });

        assert!(applied);
        assert_eq!(model.geocode_status(), QueryStatus::Ready);
        assert_eq!(model.daily_status(), QueryStatus::Loading);
        assert_eq!(
            model.daily.inputs().map(|r| r.range),
            Some(DateRange::new(date(2026, 10, 16), date(2026, 10, 31)))
        );
    }

    #[tokio::test]
    async fn test_stale_geocode_is_ignored() {
        let mut model = model(date(2026, 10, 16));
        model.search_city("Paris");
        let stale = model.geocode.generation();
        model.search_city("Rome");

        let applied = model.apply(WeatherServiceMessage::GeocodeDone {
            generation: stale,
            result: Ok(Location {
                latitude: 48.85,
                longitude: 2.35,
                label: "Paris".into(),
            }),
        });

        assert!(!applied);
        assert_eq!(model.geocode_status(), QueryStatus::Loading);
        assert!(model.location().is_none());
        assert_eq!(model.daily_status(), QueryStatus::Idle);
    }

    #[tokio::test]
    async fn test_far_month_skips_daily_call() {
        let mut model = model(date(2026, 10, 16));
        model.search_city("Lisbon");
        let generation = model.geocode.generation();
        model.apply(WeatherServiceMessage::GeocodeDone {
            generation,
            result: Ok(Location {
                latitude: 38.72,
                longitude: -9.14,
                label: "Lisbon".into(),
            }),
        });

        model.change_month(3).unwrap();
        assert_eq!(model.daily_status(), QueryStatus::Empty);
        assert!(!model.is_loading());
        assert!(model.hints().contains(&Hint::NoForecast));
        assert!(model.cells().iter().all(|c| !c.has_data()));
    }

    #[tokio::test]
    async fn test_select_requires_daily_data() {
        let mut model = model(date(2026, 10, 16));
        assert!(!model.select_date(date(2026, 10, 17)));
        assert!(model.day_sheet().is_none());
        assert_eq!(model.hourly_status(), QueryStatus::Idle);
    }

    #[tokio::test]
    async fn test_day_sheet_hidden_without_location() {
        let mut model = model(date(2026, 10, 16));
        model.search_city("Lisbon");
        model.apply(WeatherServiceMessage::GeocodeDone {
            generation: model.geocode.generation(),
            result: Ok(Location {
                latitude: 38.72,
                longitude: -9.14,
                label: "Lisbon, Lisbon".into(),
            }),
        });
        let forecast: DailyForecast = [DailyForecastEntry {
            date: date(2026, 10, 16),
            weather_code: Some(0),
            temperature_max: Some(21.0),
            temperature_min: Some(12.0),
            precipitation_mm: Some(0.0),
        }]
        .into_iter()
        .collect();
        assert!(model.apply(WeatherServiceMessage::DailyDone {
            generation: model.daily.generation(),
            result: Ok(forecast),
        }));
        assert!(model.select_date(date(2026, 10, 16)));
        assert_eq!(
            model.day_sheet().map(|s| s.city),
            Some("Lisbon, Lisbon".to_string())
        );

        model.search_city("Springfield");
        assert!(model.day_sheet().is_none());
        assert!(model.apply(WeatherServiceMessage::GeocodeDone {
            generation: model.geocode.generation(),
            result: Err(emocal_weather::WeatherError::NotFound("Springfield".into())),
        }));

        assert_eq!(model.geocode_status(), QueryStatus::Empty);
        assert_eq!(model.hourly_status(), QueryStatus::Idle);
        assert!(model.day_sheet().is_none());
        assert_eq!(model.view().selected, Some(date(2026, 10, 16)));
    }

    #[tokio::test]
    async fn test_hint_text() {
        let hint = Hint::Location {
            label: "Lisbon, Lisbon".into(),
            window: Some(DateRange::new(date(2026, 10, 16), date(2026, 10, 31))),
        };
        assert_eq!(
            hint.to_string(),
            "Lisbon, Lisbon \u{b7} forecast 2026-10-16 \u{2192} 2026-10-31"
        );
        assert_eq!(
            Hint::CityNotFound.to_string(),
            "City not found. Try another name."
        );
    }
}
