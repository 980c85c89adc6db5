//! Terminal presentation for emocal: the calendar model, its weather
//! services, and text rendering.

pub mod command;
pub mod error_mapping;
pub mod format;
pub mod models;
pub mod query;
pub mod render;
pub mod services;
pub mod settings;

pub use command::{Command, CommandError, DayArg};
pub use models::{CalendarModel, DayCell, DaySheet, Hint, HourRow};
pub use query::{Outcome, Query, QueryStatus, Ticket};
pub use render::{render_calendar, render_day_sheet, render_state};
pub use services::WeatherServices;
pub use settings::ModelSettings;
