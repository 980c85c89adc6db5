//! Month grid: always 6 weeks of 7 days, Sunday first.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::YearMonth;

pub const GRID_ROWS: usize = 6;
pub const GRID_COLUMNS: usize = 7;
pub const GRID_CELLS: usize = GRID_ROWS * GRID_COLUMNS;

pub const WEEKDAY_LABELS: [&str; GRID_COLUMNS] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub date: NaiveDate,
    /// False for leading/trailing days of the neighbouring months
    pub in_month: bool,
}

/// 42 consecutive days starting from the Sunday on or before the 1st.
pub fn month_grid(month: YearMonth) -> Vec<GridCell> {
    let first = month.first_day();
    let lead = u64::from(first.weekday().num_days_from_sunday());
    let start = first - Days::new(lead);

    start
        .iter_days()
        .take(GRID_CELLS)
        .map(|date| GridCell {
            date,
            in_month: month.contains(date),
        })
        .collect()
}
