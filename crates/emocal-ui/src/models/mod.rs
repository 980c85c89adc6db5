pub mod calendar_model;

pub use calendar_model::{CalendarModel, DayCell, DaySheet, Hint, HourRow};
