//! Reconciles the displayed month with the forecast horizon.
//!
//! The provider only serves `[today, today + horizon_days]`, so the range
//! requested for a month is the intersection of the two. An empty result
//! means there is nothing to request for that month.

use chrono::NaiveDate;

use crate::types::{DateRange, YearMonth};

/// Days after today the provider covers by default (16-day inclusive span).
pub const DEFAULT_HORIZON_DAYS: u32 = 15;

/// Forecast horizon `[today, today + horizon_days]`.
pub fn horizon(today: NaiveDate, horizon_days: u32) -> DateRange {
    DateRange::forward(today, horizon_days)
}

/// Range to request for `month`: `[max(first, today), min(last, today + H)]`.
/// Check [`DateRange::is_empty`] before issuing a request.
pub fn request_window(month: YearMonth, today: NaiveDate, horizon_days: u32) -> DateRange {
    let horizon = horizon(today, horizon_days);
    DateRange::new(
        month.first_day().max(horizon.start),
        month.last_day().min(horizon.end),
    )
}
