//! Serializable view state. Everything on screen is derived from this value,
//! "today", and the latest successful fetch results.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;
use crate::grid::{month_grid, GridCell};
use crate::types::{DateRange, YearMonth};
use crate::window::request_window;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    /// Month being displayed
    pub month: YearMonth,
    /// City committed by the last search (not the text being typed)
    pub city: Option<String>,
    /// Date whose hourly detail is open
    pub selected: Option<NaiveDate>,
}

impl ViewState {
    pub fn new(month: YearMonth) -> Self {
        Self {
            month,
            city: None,
            selected: None,
        }
    }

    /// View of the month containing `today`.
    pub fn for_today(today: NaiveDate) -> Result<Self, CalendarError> {
        Ok(Self::new(YearMonth::containing(today)?))
    }

    /// Commit search text; blank text clears the city.
    pub fn commit_city(&mut self, text: &str) {
        let trimmed = text.trim();
        self.city = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    pub fn shift_month(&mut self, delta: i32) -> Result<(), CalendarError> {
        self.month = self.month.shift(delta)?;
        Ok(())
    }

    pub fn grid(&self) -> Vec<GridCell> {
        month_grid(self.month)
    }

    pub fn request_window(&self, today: NaiveDate, horizon_days: u32) -> DateRange {
        request_window(self.month, today, horizon_days)
    }
}
