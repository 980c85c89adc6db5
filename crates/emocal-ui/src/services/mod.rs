pub mod weather_service;

pub use weather_service::{
    request_daily, request_geocode, request_hourly, DailyRequest, HourlyRequest,
    WeatherServiceMessage, WeatherServices,
};
