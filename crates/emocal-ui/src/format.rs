//! Presentation-time number and date formatting. Stored data stays in the
//! provider's units; conversion and rounding happen only here.

use chrono::{NaiveDate, NaiveDateTime, Timelike};

const MM_PER_INCH: f64 = 25.4;

/// Round to the nearest integer, halves toward positive infinity
/// (so -2.5 becomes -2, not -3).
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// "21°", or "--" when the provider had no value
pub fn format_temp(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}\u{b0}", round_half_up(v)),
        None => "--".to_string(),
    }
}

pub fn mm_to_inches(mm: f64) -> f64 {
    mm / MM_PER_INCH
}

/// "0.50 in" with two decimals
pub fn format_precip(mm: Option<f64>) -> String {
    match mm {
        Some(v) => format!("{:.2} in", mm_to_inches(v)),
        None => "-- in".to_string(),
    }
}

/// "1p", "12a"
pub fn hour_label(time: NaiveDateTime) -> String {
    let hour = time.hour();
    let suffix = if hour >= 12 { "p" } else { "a" };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}{}", hour12, suffix)
}

/// "Friday, Oct 16"
pub fn long_date(date: NaiveDate) -> String {
    date.format("%A, %b %-d").to_string()
}

pub fn ymd(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
